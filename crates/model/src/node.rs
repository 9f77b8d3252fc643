use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    bounded::BoundedString,
    id::{HasId, Id},
};
use uuid::Uuid;

use crate::{ExampleData, Resource, ResourceKind};

pub type NodeName = BoundedString<32>;

/// A cluster of stops that riders perceive as one place, e.g. both sides of a
/// street.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Node {
    #[serde(default)]
    pub id: Id<Node>,
    pub name: NodeName,
}

impl HasId for Node {
    type IdType = Uuid;
}

impl Resource for Node {
    const KIND: ResourceKind = ResourceKind::Node;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn describe(id: &Id<Self>) -> String {
        id.to_string()
    }
}

impl ExampleData for Node {
    fn example_data() -> Self {
        Self {
            id: Id::generate(),
            name: NodeName::new("Raisdorf, Bahnhof").unwrap_or_default(),
        }
    }
}
