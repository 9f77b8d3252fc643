use model::Stop;
use public_transport::database::{DatabaseError, Result};
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{stop::StopRow, to_models, DatabaseRow};

use super::convert_error;

// Locations travel as WKB in both directions, see `utility::geo`.

pub async fn get<'c, E>(executor: E, id: &Id<Stop>) -> Result<Option<Stop>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, StopRow>(
        "
        SELECT id, node_id, ST_AsBinary(location) AS location
        FROM stops
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .map(|row: StopRow| row.to_model())
    .transpose()
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<Stop>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, StopRow>(
        "
        SELECT id, node_id, ST_AsBinary(location) AS location
        FROM stops
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|rows: Vec<StopRow>| to_models(rows))
}

pub async fn put<'c, E>(executor: E, element: &Stop) -> Result<Stop>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = StopRow::from_model(element)?;
    sqlx::query_as::<_, StopRow>(
        "
        INSERT INTO stops(id, node_id, location)
        VALUES ($1, $2, ST_GeogFromWKB($3))
        ON CONFLICT (id)
        DO UPDATE SET
            node_id = EXCLUDED.node_id,
            location = EXCLUDED.location
        RETURNING id, node_id, ST_AsBinary(location) AS location;
        ",
    )
    .bind(row.id)
    .bind(row.node_id)
    .bind(row.location)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: StopRow| row.to_model())
}

pub async fn delete<'c, E>(executor: E, id: &Id<Stop>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM stops WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    match result.rows_affected() {
        0 => Err(DatabaseError::NotFound),
        _ => Ok(()),
    }
}

pub async fn exists<'c, E>(executor: E, id: &Id<Stop>) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stops WHERE id = $1);")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
}
