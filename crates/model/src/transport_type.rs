use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    bounded::BoundedString,
    id::{HasId, Id},
};

use crate::{ExampleData, Resource, ResourceKind};

pub type TypeName = BoundedString<12>;

/// A mode of transport, e.g. bus or tram. Identified by its name alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransportType {
    pub name: Id<TransportType>,
}

impl TransportType {
    pub fn new(name: Id<TransportType>) -> Self {
        Self { name }
    }
}

impl HasId for TransportType {
    type IdType = TypeName;
}

impl Resource for TransportType {
    const KIND: ResourceKind = ResourceKind::Type;

    fn id(&self) -> Id<Self> {
        self.name.clone()
    }

    fn describe(id: &Id<Self>) -> String {
        id.to_string()
    }
}

impl ExampleData for TransportType {
    fn example_data() -> Self {
        Self {
            name: Id::new(TypeName::new("bus").unwrap_or_default()),
        }
    }
}
