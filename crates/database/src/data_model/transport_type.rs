use async_trait::async_trait;
use model::TransportType;
use public_transport::database::{DatabaseError, Repo, Result, TypeRepo};
use sqlx::prelude::FromRow;
use utility::{bounded::BoundedString, id::Id};

use crate::queries::transport_type::{delete, exists, get, get_all, insert, put, rename};
use crate::PgDatabaseTransaction;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct TransportTypeRow {
    pub name: String,
}

impl DatabaseRow for TransportTypeRow {
    type Model = TransportType;

    fn to_model(self) -> Result<TransportType> {
        BoundedString::new(self.name)
            .map(|name| TransportType::new(Id::new(name)))
            .map_err(DatabaseError::other)
    }

    fn from_model(model: &TransportType) -> Result<Self> {
        Ok(Self {
            name: model.name.raw().into_inner(),
        })
    }
}

#[async_trait]
impl<'a> Repo<TransportType> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: &Id<TransportType>) -> Result<Option<TransportType>> {
        get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<TransportType>> {
        get_all(&mut *self.tx).await
    }

    async fn put(&mut self, element: &TransportType) -> Result<TransportType> {
        put(&mut *self.tx, element).await
    }

    async fn delete(&mut self, id: &Id<TransportType>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }

    async fn exists(&mut self, id: &Id<TransportType>) -> Result<bool> {
        exists(&mut *self.tx, id).await
    }
}

#[async_trait]
impl<'a> TypeRepo for PgDatabaseTransaction<'a> {
    async fn insert(&mut self, element: &TransportType) -> Result<TransportType> {
        insert(&mut *self.tx, element).await
    }

    async fn rename(
        &mut self,
        name: &Id<TransportType>,
        element: &TransportType,
    ) -> Result<TransportType> {
        rename(&mut *self.tx, name, element).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlong_stored_name_fails() {
        let row = TransportTypeRow {
            name: "trolleybus-line".to_owned(),
        };
        assert!(matches!(row.to_model(), Err(DatabaseError::Other(_))));
    }
}
