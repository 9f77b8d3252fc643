use async_trait::async_trait;
use model::Node;
use public_transport::database::{DatabaseError, Repo, Result};
use sqlx::prelude::FromRow;
use utility::{bounded::BoundedString, id::Id};
use uuid::Uuid;

use crate::queries::node::{delete, exists, get, get_all, put};
use crate::PgDatabaseTransaction;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct NodeRow {
    pub id: Uuid,
    pub name: String,
}

impl DatabaseRow for NodeRow {
    type Model = Node;

    fn to_model(self) -> Result<Node> {
        Ok(Node {
            id: Id::new(self.id),
            name: BoundedString::new(self.name).map_err(DatabaseError::other)?,
        })
    }

    fn from_model(node: &Node) -> Result<Self> {
        Ok(Self {
            id: node.id.raw(),
            name: node.name.to_string(),
        })
    }
}

#[async_trait]
impl<'a> Repo<Node> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: &Id<Node>) -> Result<Option<Node>> {
        get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<Node>> {
        get_all(&mut *self.tx).await
    }

    async fn put(&mut self, element: &Node) -> Result<Node> {
        put(&mut *self.tx, element).await
    }

    async fn delete(&mut self, id: &Id<Node>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }

    async fn exists(&mut self, id: &Id<Node>) -> Result<bool> {
        exists(&mut *self.tx, id).await
    }
}
