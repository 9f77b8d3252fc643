use async_trait::async_trait;
use model::Stop;
use utility::id::Id;

use super::ResourceService;
use crate::{database::Database, session::Session, ServiceResult};

pub struct StopService<'s, D: Database> {
    session: &'s mut Session<D>,
}

impl<'s, D: Database> StopService<'s, D> {
    pub fn new(session: &'s mut Session<D>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<'s, D: Database> ResourceService for StopService<'s, D> {
    type Resource = Stop;

    async fn list(&mut self) -> ServiceResult<Vec<Stop>> {
        super::list(self.session).await
    }

    async fn get(&mut self, id: &Id<Stop>) -> ServiceResult<Stop> {
        super::get(self.session, id).await
    }

    async fn update(&mut self, mut new: Stop) -> ServiceResult<Stop> {
        new.id = new.id.or_generate();
        super::upsert(self.session, new).await
    }

    async fn delete(&mut self, id: &Id<Stop>) -> ServiceResult<()> {
        super::delete(self.session, id).await
    }

    async fn contains(&mut self, candidate: &Stop) -> ServiceResult<bool> {
        super::contains(self.session, &candidate.id).await
    }
}
