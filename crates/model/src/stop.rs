use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::{Latitude, Longitude},
    id::{HasId, Id},
};
use uuid::Uuid;

use crate::{ExampleData, Node, Resource, ResourceKind};

/// A single boarding point. No two stops share the exact same coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Stop {
    #[serde(default)]
    pub id: Id<Stop>,
    pub node_id: Id<Node>,
    pub lat: Latitude,
    pub lon: Longitude,
}

impl HasId for Stop {
    type IdType = Uuid;
}

impl Resource for Stop {
    const KIND: ResourceKind = ResourceKind::Stop;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn describe(id: &Id<Self>) -> String {
        id.to_string()
    }
}

impl ExampleData for Stop {
    fn example_data() -> Self {
        Self {
            id: Id::generate(),
            node_id: Id::generate(),
            lat: Latitude::from_scaled(542795810),
            lon: Longitude::from_scaled(102489470),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_id_deserializes_empty() {
        let stop: Stop = serde_json::from_str(&format!(
            r#"{{"node_id": "{}", "lat": 54.279581, "lon": "10.248947"}}"#,
            Id::<Node>::generate()
        ))
        .unwrap();
        assert!(stop.id.is_empty());
        assert_eq!(stop.lat.to_string(), "54.2795810");
        assert_eq!(stop.lon.to_string(), "10.2489470");
    }

    #[test]
    fn test_rejects_out_of_range_latitude() {
        let result = serde_json::from_str::<Stop>(&format!(
            r#"{{"node_id": "{}", "lat": 91.0, "lon": 10.0}}"#,
            Id::<Node>::generate()
        ));
        assert!(result.is_err());
    }
}
