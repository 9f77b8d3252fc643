use model::{Route, RouteStop, Stop};
use public_transport::database::{DatabaseError, Result};
use sqlx::{Executor, Postgres};
use utility::{
    id::{Id, IdWrapper},
    let_also::LetAlso,
};

use crate::data_model::{route_stop::RouteStopRow, to_models, DatabaseRow};

use super::convert_error;

pub async fn get<'c, E>(executor: E, id: &Id<RouteStop>) -> Result<Option<RouteStop>>
where
    E: Executor<'c, Database = Postgres>,
{
    let key = id.raw();
    sqlx::query_as::<_, RouteStopRow>(
        "
        SELECT route_id, stop_id, distance
        FROM route_stops
        WHERE route_id = $1 AND stop_id = $2;
        ",
    )
    .bind(key.route_id.raw())
    .bind(key.stop_id.raw())
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .map(|row: RouteStopRow| row.to_model())
    .transpose()
}

/// Omitted filters match every row.
pub async fn filter<'c, E>(
    executor: E,
    route_id: Option<&Id<Route>>,
    stop_id: Option<&Id<Stop>>,
) -> Result<Vec<RouteStop>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, RouteStopRow>(
        "
        SELECT route_id, stop_id, distance
        FROM route_stops
        WHERE ($1::uuid IS NULL OR route_id = $1)
            AND ($2::uuid IS NULL OR stop_id = $2)
        ORDER BY route_id, distance;
        ",
    )
    .bind(route_id.raw())
    .bind(stop_id.raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|rows: Vec<RouteStopRow>| to_models(rows))
}

pub async fn last<'c, E>(executor: E, route_id: Option<&Id<Route>>) -> Result<Option<RouteStop>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, RouteStopRow>(
        "
        SELECT route_id, stop_id, distance
        FROM route_stops
        WHERE $1::uuid IS NULL OR route_id = $1
        ORDER BY distance DESC
        LIMIT 1;
        ",
    )
    .bind(route_id.raw())
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .map(|row: RouteStopRow| row.to_model())
    .transpose()
}

pub async fn next_after<'c, E>(
    executor: E,
    route_id: Option<&Id<Route>>,
    distance: i32,
) -> Result<Option<RouteStop>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, RouteStopRow>(
        "
        SELECT route_id, stop_id, distance
        FROM route_stops
        WHERE ($1::uuid IS NULL OR route_id = $1)
            AND distance > $2
        ORDER BY distance ASC
        LIMIT 1;
        ",
    )
    .bind(route_id.raw())
    .bind(distance)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .map(|row: RouteStopRow| row.to_model())
    .transpose()
}

pub async fn put<'c, E>(executor: E, element: &RouteStop) -> Result<RouteStop>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = RouteStopRow::from_model(element)?;
    sqlx::query_as::<_, RouteStopRow>(
        "
        INSERT INTO route_stops(route_id, stop_id, distance)
        VALUES ($1, $2, $3)
        ON CONFLICT (route_id, stop_id)
        DO UPDATE SET distance = EXCLUDED.distance
        RETURNING route_id, stop_id, distance;
        ",
    )
    .bind(row.route_id)
    .bind(row.stop_id)
    .bind(row.distance)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: RouteStopRow| row.to_model())
}

/// One statement, so the deferrable unique constraint on `(route_id,
/// distance)` is only checked once all rows moved.
pub async fn respace<'c, E>(executor: E, route_id: &Id<Route>, step: i32) -> Result<u64>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        UPDATE route_stops AS target
        SET distance = (ordered.position * $2::integer)::integer
        FROM (
            SELECT stop_id, ROW_NUMBER() OVER (ORDER BY distance) - 1 AS position
            FROM route_stops
            WHERE route_id = $1
        ) AS ordered
        WHERE target.route_id = $1 AND target.stop_id = ordered.stop_id;
        ",
    )
    .bind(route_id.raw())
    .bind(step)
    .execute(executor)
    .await
    .map_err(convert_error)
    .map(|result| result.rows_affected())
}

pub async fn delete<'c, E>(executor: E, id: &Id<RouteStop>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let key = id.raw();
    let result = sqlx::query("DELETE FROM route_stops WHERE route_id = $1 AND stop_id = $2;")
        .bind(key.route_id.raw())
        .bind(key.stop_id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    match result.rows_affected() {
        0 => Err(DatabaseError::NotFound),
        _ => Ok(()),
    }
}

pub async fn exists<'c, E>(executor: E, id: &Id<RouteStop>) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    let key = id.raw();
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM route_stops WHERE route_id = $1 AND stop_id = $2);",
    )
    .bind(key.route_id.raw())
    .bind(key.stop_id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
}
