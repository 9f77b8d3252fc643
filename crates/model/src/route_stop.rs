use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{ExampleData, Resource, ResourceKind, Route, Stop};

/// The composite key of a [`RouteStop`]. Always route first, then stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteStopKey {
    pub route_id: Id<Route>,
    pub stop_id: Id<Stop>,
}

impl RouteStopKey {
    pub fn new(route_id: Id<Route>, stop_id: Id<Stop>) -> Self {
        Self { route_id, stop_id }
    }
}

impl fmt::Display for RouteStopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.route_id, self.stop_id)
    }
}

impl From<RouteStopKey> for Id<RouteStop> {
    fn from(key: RouteStopKey) -> Self {
        Id::new(key)
    }
}

/// Places a stop on a route. Sorting a route's stops by `distance` gives the
/// order riders see them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteStop {
    pub route_id: Id<Route>,
    pub stop_id: Id<Stop>,
    pub distance: i32,
}

impl RouteStop {
    pub fn key(&self) -> RouteStopKey {
        RouteStopKey::new(self.route_id, self.stop_id)
    }
}

impl HasId for RouteStop {
    type IdType = RouteStopKey;
}

impl Resource for RouteStop {
    const KIND: ResourceKind = ResourceKind::RouteStop;

    fn id(&self) -> Id<Self> {
        self.key().into()
    }

    fn describe(id: &Id<Self>) -> String {
        id.to_string()
    }
}

impl ExampleData for RouteStop {
    fn example_data() -> Self {
        Self {
            route_id: Id::generate(),
            stop_id: Id::generate(),
            distance: 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_renders_route_before_stop() {
        let route_id = Id::<Route>::generate();
        let stop_id = Id::<Stop>::generate();
        let route_stop = RouteStop {
            route_id,
            stop_id,
            distance: 0,
        };
        assert_eq!(
            RouteStop::describe(&route_stop.id()),
            format!("({route_id}, {stop_id})")
        );
        assert_eq!(route_stop.id().raw().route_id, route_id);
    }
}
