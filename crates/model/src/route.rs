use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    bounded::BoundedString,
    id::{HasId, Id},
};
use uuid::Uuid;

use crate::{transport_type::TypeName, ExampleData, Resource, ResourceKind, TransportType};

pub type RouteNumber = BoundedString<6>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Route {
    /// Left empty by clients that want the server to assign one.
    #[serde(default)]
    pub id: Id<Route>,
    pub number: RouteNumber,
    pub type_name: Id<TransportType>,
}

impl HasId for Route {
    type IdType = Uuid;
}

impl Resource for Route {
    const KIND: ResourceKind = ResourceKind::Route;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn describe(id: &Id<Self>) -> String {
        id.to_string()
    }
}

impl ExampleData for Route {
    fn example_data() -> Self {
        Self {
            id: Id::generate(),
            number: RouteNumber::new("300").unwrap_or_default(),
            type_name: Id::new(TypeName::new("bus").unwrap_or_default()),
        }
    }
}
