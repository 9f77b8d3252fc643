use std::{error, result};

use async_trait::async_trait;
use model::{Node, Resource, Route, RouteStop, Stop, TransportType};
use utility::id::Id;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("row not found")]
    NotFound,
    /// A primary key, unique, foreign key or check constraint rejected a write.
    #[error("integrity constraint violated: {0}")]
    Integrity(String),
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<E: error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait Repo<T: Resource> {
    async fn get(&mut self, id: &Id<T>) -> Result<Option<T>>;
    async fn get_all(&mut self) -> Result<Vec<T>>;
    /// Inserts `element`, or overwrites the row with the same identity.
    async fn put(&mut self, element: &T) -> Result<T>;
    /// Fails with [`DatabaseError::NotFound`] when there is nothing to delete.
    async fn delete(&mut self, id: &Id<T>) -> Result<()>;
    async fn exists(&mut self, id: &Id<T>) -> Result<bool>;
}

#[async_trait]
pub trait TypeRepo: Repo<TransportType> {
    /// Plain insert, a present name is an integrity violation.
    async fn insert(&mut self, element: &TransportType) -> Result<TransportType>;
    async fn rename(
        &mut self,
        name: &Id<TransportType>,
        element: &TransportType,
    ) -> Result<TransportType>;
}

#[async_trait]
pub trait RouteStopRepo: Repo<RouteStop> {
    /// Route stops matching all given filters, ordered by route and distance.
    async fn filter(
        &mut self,
        route_id: Option<&Id<Route>>,
        stop_id: Option<&Id<Stop>>,
    ) -> Result<Vec<RouteStop>>;

    /// The route stop with the greatest distance, on `route_id` if given.
    async fn last(&mut self, route_id: Option<&Id<Route>>) -> Result<Option<RouteStop>>;

    /// The route stop with the smallest distance greater than `distance`.
    async fn next_after(
        &mut self,
        route_id: Option<&Id<Route>>,
        distance: i32,
    ) -> Result<Option<RouteStop>>;

    /// Renumbers the stops of a route to `0, step, 2 * step, ...` keeping
    /// their order. Returns the number of rows touched.
    async fn respace(&mut self, route_id: &Id<Route>, step: i32) -> Result<u64>;
}

pub trait DatabaseOperations:
    TypeRepo + Repo<Route> + Repo<Node> + Repo<Stop> + RouteStopRepo + Send
{
}

impl<T> DatabaseOperations for T where
    T: TypeRepo + Repo<Route> + Repo<Node> + Repo<Stop> + RouteStopRepo + Send
{
}

/// Dropping a transaction without committing it rolls it back.
#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

/// trait to implement a public transport database.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Transaction: DatabaseTransaction + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;
}
