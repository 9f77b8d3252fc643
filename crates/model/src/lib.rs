use std::fmt;

use serde::Serialize;
use utility::id::{HasId, Id};

pub mod node;
pub mod route;
pub mod route_stop;
pub mod stop;
pub mod transport_type;

pub use node::Node;
pub use route::Route;
pub use route_stop::{RouteStop, RouteStopKey};
pub use stop::Stop;
pub use transport_type::TransportType;

pub trait ExampleData {
    fn example_data() -> Self;
}

/// The kinds of rows the network is made of. Used to tell callers which kind
/// of resource an error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    Type,
    Route,
    Node,
    Stop,
    RouteStop,
    /// Any one of route, node or stop, when looked up by a bare identifier.
    Unit,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "Type",
            Self::Route => "Route",
            Self::Node => "Node",
            Self::Stop => "Stop",
            Self::RouteStop => "RouteStop",
            Self::Unit => "Unit",
        };
        f.write_str(name)
    }
}

/// A stored entity, addressed by an `Id<Self>` whatever shape the key has.
pub trait Resource: HasId + Serialize + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> Id<Self>;

    /// Renders an identifier for diagnostics.
    fn describe(id: &Id<Self>) -> String;
}
