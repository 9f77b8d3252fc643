use async_trait::async_trait;
use model::Route;
use public_transport::database::{DatabaseError, Repo, Result};
use sqlx::prelude::FromRow;
use utility::{bounded::BoundedString, id::Id};
use uuid::Uuid;

use crate::queries::route::{delete, exists, get, get_all, put};
use crate::PgDatabaseTransaction;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct RouteRow {
    pub id: Uuid,
    pub number: String,
    pub type_name: String,
}

impl DatabaseRow for RouteRow {
    type Model = Route;

    fn to_model(self) -> Result<Route> {
        Ok(Route {
            id: Id::new(self.id),
            number: BoundedString::new(self.number).map_err(DatabaseError::other)?,
            type_name: BoundedString::new(self.type_name)
                .map(Id::new)
                .map_err(DatabaseError::other)?,
        })
    }

    fn from_model(route: &Route) -> Result<Self> {
        Ok(Self {
            id: route.id.raw(),
            number: route.number.to_string(),
            type_name: route.type_name.to_string(),
        })
    }
}

#[async_trait]
impl<'a> Repo<Route> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: &Id<Route>) -> Result<Option<Route>> {
        get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<Route>> {
        get_all(&mut *self.tx).await
    }

    async fn put(&mut self, element: &Route) -> Result<Route> {
        put(&mut *self.tx, element).await
    }

    async fn delete(&mut self, id: &Id<Route>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }

    async fn exists(&mut self, id: &Id<Route>) -> Result<bool> {
        exists(&mut *self.tx, id).await
    }
}
