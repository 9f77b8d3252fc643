use async_trait::async_trait;
use model::Stop;
use public_transport::database::{DatabaseError, Repo, Result};
use sqlx::prelude::FromRow;
use utility::{geo, id::Id};
use uuid::Uuid;

use crate::queries::stop::{delete, exists, get, get_all, put};
use crate::PgDatabaseTransaction;

use super::DatabaseRow;

/// `location` holds the WKB of the stored geography point.
#[derive(Debug, Clone, FromRow)]
pub struct StopRow {
    pub id: Uuid,
    pub node_id: Uuid,
    pub location: Vec<u8>,
}

impl DatabaseRow for StopRow {
    type Model = Stop;

    fn to_model(self) -> Result<Stop> {
        // anything but a point here means the table is corrupt
        let (lat, lon) = geo::decode(&self.location).map_err(DatabaseError::other)?;
        Ok(Stop {
            id: Id::new(self.id),
            node_id: Id::new(self.node_id),
            lat,
            lon,
        })
    }

    fn from_model(stop: &Stop) -> Result<Self> {
        Ok(Self {
            id: stop.id.raw(),
            node_id: stop.node_id.raw(),
            location: geo::encode(stop.lat, stop.lon).map_err(DatabaseError::other)?,
        })
    }
}

#[async_trait]
impl<'a> Repo<Stop> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: &Id<Stop>) -> Result<Option<Stop>> {
        get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<Stop>> {
        get_all(&mut *self.tx).await
    }

    async fn put(&mut self, element: &Stop) -> Result<Stop> {
        put(&mut *self.tx, element).await
    }

    async fn delete(&mut self, id: &Id<Stop>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }

    async fn exists(&mut self, id: &Id<Stop>) -> Result<bool> {
        exists(&mut *self.tx, id).await
    }
}
