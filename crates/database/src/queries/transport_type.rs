use model::TransportType;
use public_transport::database::{DatabaseError, Result};
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{to_models, transport_type::TransportTypeRow, DatabaseRow};

use super::convert_error;

pub async fn get<'c, E>(executor: E, name: &Id<TransportType>) -> Result<Option<TransportType>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, TransportTypeRow>("SELECT name FROM types WHERE name = $1;")
        .bind(name.raw_ref::<str>())
        .fetch_optional(executor)
        .await
        .map_err(convert_error)?
        .map(|row: TransportTypeRow| row.to_model())
        .transpose()
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<TransportType>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, TransportTypeRow>("SELECT name FROM types ORDER BY name;")
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|rows: Vec<TransportTypeRow>| to_models(rows))
}

pub async fn insert<'c, E>(executor: E, element: &TransportType) -> Result<TransportType>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = TransportTypeRow::from_model(element)?;
    sqlx::query_as::<_, TransportTypeRow>("INSERT INTO types(name) VALUES ($1) RETURNING name;")
        .bind(row.name)
        .fetch_one(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|row: TransportTypeRow| row.to_model())
}

/// Types have no attributes besides their name, so updating one is a no-op
/// that still has to create it when it is missing.
pub async fn put<'c, E>(executor: E, element: &TransportType) -> Result<TransportType>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = TransportTypeRow::from_model(element)?;
    sqlx::query_as::<_, TransportTypeRow>(
        "
        INSERT INTO types(name)
        VALUES ($1)
        ON CONFLICT (name)
        DO UPDATE SET name = EXCLUDED.name
        RETURNING name;
        ",
    )
    .bind(row.name)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: TransportTypeRow| row.to_model())
}

pub async fn rename<'c, E>(
    executor: E,
    name: &Id<TransportType>,
    element: &TransportType,
) -> Result<TransportType>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = TransportTypeRow::from_model(element)?;
    sqlx::query_as::<_, TransportTypeRow>(
        "UPDATE types SET name = $2 WHERE name = $1 RETURNING name;",
    )
    .bind(name.raw_ref::<str>())
    .bind(row.name)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .ok_or(DatabaseError::NotFound)
    .and_then(|row: TransportTypeRow| row.to_model())
}

pub async fn delete<'c, E>(executor: E, name: &Id<TransportType>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM types WHERE name = $1;")
        .bind(name.raw_ref::<str>())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    match result.rows_affected() {
        0 => Err(DatabaseError::NotFound),
        _ => Ok(()),
    }
}

pub async fn exists<'c, E>(executor: E, name: &Id<TransportType>) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM types WHERE name = $1);")
        .bind(name.raw_ref::<str>())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
}
