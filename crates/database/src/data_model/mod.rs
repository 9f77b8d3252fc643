use model::Resource;
use public_transport::database::Result;

pub mod node;
pub mod route;
pub mod route_stop;
pub mod stop;
pub mod transport_type;

/// A row as `sqlx` reads and writes it. Conversions are fallible because
/// the column types are looser than the model's.
pub trait DatabaseRow: Sized {
    type Model: Resource;

    fn to_model(self) -> Result<Self::Model>;
    fn from_model(model: &Self::Model) -> Result<Self>;
}

pub fn to_models<R: DatabaseRow>(rows: Vec<R>) -> Result<Vec<R::Model>> {
    rows.into_iter().map(R::to_model).collect()
}
