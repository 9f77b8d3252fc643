use async_trait::async_trait;
use model::{Resource, Route, RouteStop, Stop};
use utility::id::Id;

use super::ResourceService;
use crate::{
    database::{Database, RouteStopRepo},
    placement::{self, AnchorScope},
    session::Session,
    ServiceResult,
};

pub struct RouteStopService<'s, D: Database> {
    session: &'s mut Session<D>,
    scope: AnchorScope,
}

impl<'s, D: Database> RouteStopService<'s, D> {
    pub fn new(session: &'s mut Session<D>) -> Self {
        Self {
            session,
            scope: AnchorScope::default(),
        }
    }

    pub fn with_scope(mut self, scope: AnchorScope) -> Self {
        self.scope = scope;
        self
    }

    /// Omitted filters match everything.
    pub async fn list_filtered(
        &mut self,
        route_id: Option<&Id<Route>>,
        stop_id: Option<&Id<Stop>>,
    ) -> ServiceResult<Vec<RouteStop>> {
        Ok(self.session.tx().await?.filter(route_id, stop_id).await?)
    }

    /// Puts `stop_id` on `route_id` right behind `after`, or at the end of
    /// the route. A stop already on the route is moved.
    pub async fn place(
        &mut self,
        route_id: &Id<Route>,
        stop_id: &Id<Stop>,
        after: Option<&Id<Stop>>,
    ) -> ServiceResult<RouteStop> {
        placement::place(self.session, self.scope, route_id, stop_id, after).await
    }
}

#[async_trait]
impl<'s, D: Database> ResourceService for RouteStopService<'s, D> {
    type Resource = RouteStop;

    async fn list(&mut self) -> ServiceResult<Vec<RouteStop>> {
        self.list_filtered(None, None).await
    }

    async fn get(&mut self, id: &Id<RouteStop>) -> ServiceResult<RouteStop> {
        super::get(self.session, id).await
    }

    async fn update(&mut self, new: RouteStop) -> ServiceResult<RouteStop> {
        super::upsert(self.session, new).await
    }

    async fn delete(&mut self, id: &Id<RouteStop>) -> ServiceResult<()> {
        super::delete(self.session, id).await
    }

    async fn contains(&mut self, candidate: &RouteStop) -> ServiceResult<bool> {
        super::contains(self.session, &candidate.id()).await
    }
}
