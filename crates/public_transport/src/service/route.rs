use async_trait::async_trait;
use model::Route;
use utility::id::Id;

use super::ResourceService;
use crate::{database::Database, session::Session, ServiceResult};

pub struct RouteService<'s, D: Database> {
    session: &'s mut Session<D>,
}

impl<'s, D: Database> RouteService<'s, D> {
    pub fn new(session: &'s mut Session<D>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<'s, D: Database> ResourceService for RouteService<'s, D> {
    type Resource = Route;

    async fn list(&mut self) -> ServiceResult<Vec<Route>> {
        super::list(self.session).await
    }

    async fn get(&mut self, id: &Id<Route>) -> ServiceResult<Route> {
        super::get(self.session, id).await
    }

    async fn update(&mut self, mut new: Route) -> ServiceResult<Route> {
        new.id = new.id.or_generate();
        super::upsert(self.session, new).await
    }

    async fn delete(&mut self, id: &Id<Route>) -> ServiceResult<()> {
        super::delete(self.session, id).await
    }

    async fn contains(&mut self, candidate: &Route) -> ServiceResult<bool> {
        super::contains(self.session, &candidate.id).await
    }
}
