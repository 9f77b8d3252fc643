use model::Route;
use public_transport::database::{DatabaseError, Result};
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{route::RouteRow, to_models, DatabaseRow};

use super::convert_error;

pub async fn get<'c, E>(executor: E, id: &Id<Route>) -> Result<Option<Route>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, RouteRow>("SELECT id, number, type_name FROM routes WHERE id = $1;")
        .bind(id.raw())
        .fetch_optional(executor)
        .await
        .map_err(convert_error)?
        .map(|row: RouteRow| row.to_model())
        .transpose()
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<Route>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, RouteRow>("SELECT id, number, type_name FROM routes ORDER BY id;")
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|rows: Vec<RouteRow>| to_models(rows))
}

pub async fn put<'c, E>(executor: E, element: &Route) -> Result<Route>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = RouteRow::from_model(element)?;
    sqlx::query_as::<_, RouteRow>(
        "
        INSERT INTO routes(id, number, type_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (id)
        DO UPDATE SET
            number = EXCLUDED.number,
            type_name = EXCLUDED.type_name
        RETURNING id, number, type_name;
        ",
    )
    .bind(row.id)
    .bind(row.number)
    .bind(row.type_name)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: RouteRow| row.to_model())
}

pub async fn delete<'c, E>(executor: E, id: &Id<Route>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM routes WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    match result.rows_affected() {
        0 => Err(DatabaseError::NotFound),
        _ => Ok(()),
    }
}

pub async fn exists<'c, E>(executor: E, id: &Id<Route>) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM routes WHERE id = $1);")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
}
