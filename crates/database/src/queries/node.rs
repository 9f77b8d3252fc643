use model::Node;
use public_transport::database::{DatabaseError, Result};
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{node::NodeRow, to_models, DatabaseRow};

use super::convert_error;

pub async fn get<'c, E>(executor: E, id: &Id<Node>) -> Result<Option<Node>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, NodeRow>("SELECT id, name FROM nodes WHERE id = $1;")
        .bind(id.raw())
        .fetch_optional(executor)
        .await
        .map_err(convert_error)?
        .map(|row: NodeRow| row.to_model())
        .transpose()
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<Node>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, NodeRow>("SELECT id, name FROM nodes ORDER BY id;")
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|rows: Vec<NodeRow>| to_models(rows))
}

pub async fn put<'c, E>(executor: E, element: &Node) -> Result<Node>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = NodeRow::from_model(element)?;
    sqlx::query_as::<_, NodeRow>(
        "
        INSERT INTO nodes(id, name)
        VALUES ($1, $2)
        ON CONFLICT (id)
        DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name;
        ",
    )
    .bind(row.id)
    .bind(row.name)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: NodeRow| row.to_model())
}

pub async fn delete<'c, E>(executor: E, id: &Id<Node>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM nodes WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    match result.rows_affected() {
        0 => Err(DatabaseError::NotFound),
        _ => Ok(()),
    }
}

pub async fn exists<'c, E>(executor: E, id: &Id<Node>) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM nodes WHERE id = $1);")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
}
