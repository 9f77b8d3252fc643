use async_trait::async_trait;
use model::{Route, RouteStop, Stop};
use public_transport::database::{Repo, Result, RouteStopRepo};
use sqlx::prelude::FromRow;
use utility::id::Id;
use uuid::Uuid;

use crate::queries::route_stop::{
    delete, exists, filter, get, last, next_after, put, respace,
};
use crate::PgDatabaseTransaction;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct RouteStopRow {
    pub route_id: Uuid,
    pub stop_id: Uuid,
    pub distance: i32,
}

impl DatabaseRow for RouteStopRow {
    type Model = RouteStop;

    fn to_model(self) -> Result<RouteStop> {
        Ok(RouteStop {
            route_id: Id::new(self.route_id),
            stop_id: Id::new(self.stop_id),
            distance: self.distance,
        })
    }

    fn from_model(route_stop: &RouteStop) -> Result<Self> {
        Ok(Self {
            route_id: route_stop.route_id.raw(),
            stop_id: route_stop.stop_id.raw(),
            distance: route_stop.distance,
        })
    }
}

#[async_trait]
impl<'a> Repo<RouteStop> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: &Id<RouteStop>) -> Result<Option<RouteStop>> {
        get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<RouteStop>> {
        filter(&mut *self.tx, None, None).await
    }

    async fn put(&mut self, element: &RouteStop) -> Result<RouteStop> {
        put(&mut *self.tx, element).await
    }

    async fn delete(&mut self, id: &Id<RouteStop>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }

    async fn exists(&mut self, id: &Id<RouteStop>) -> Result<bool> {
        exists(&mut *self.tx, id).await
    }
}

#[async_trait]
impl<'a> RouteStopRepo for PgDatabaseTransaction<'a> {
    async fn filter(
        &mut self,
        route_id: Option<&Id<Route>>,
        stop_id: Option<&Id<Stop>>,
    ) -> Result<Vec<RouteStop>> {
        filter(&mut *self.tx, route_id, stop_id).await
    }

    async fn last(&mut self, route_id: Option<&Id<Route>>) -> Result<Option<RouteStop>> {
        last(&mut *self.tx, route_id).await
    }

    async fn next_after(
        &mut self,
        route_id: Option<&Id<Route>>,
        distance: i32,
    ) -> Result<Option<RouteStop>> {
        next_after(&mut *self.tx, route_id, distance).await
    }

    async fn respace(&mut self, route_id: &Id<Route>, step: i32) -> Result<u64> {
        respace(&mut *self.tx, route_id, step).await
    }
}
