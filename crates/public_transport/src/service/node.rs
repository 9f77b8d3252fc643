use async_trait::async_trait;
use model::Node;
use utility::id::Id;

use super::ResourceService;
use crate::{database::Database, session::Session, ServiceResult};

pub struct NodeService<'s, D: Database> {
    session: &'s mut Session<D>,
}

impl<'s, D: Database> NodeService<'s, D> {
    pub fn new(session: &'s mut Session<D>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<'s, D: Database> ResourceService for NodeService<'s, D> {
    type Resource = Node;

    async fn list(&mut self) -> ServiceResult<Vec<Node>> {
        super::list(self.session).await
    }

    async fn get(&mut self, id: &Id<Node>) -> ServiceResult<Node> {
        super::get(self.session, id).await
    }

    async fn update(&mut self, mut new: Node) -> ServiceResult<Node> {
        new.id = new.id.or_generate();
        super::upsert(self.session, new).await
    }

    async fn delete(&mut self, id: &Id<Node>) -> ServiceResult<()> {
        super::delete(self.session, id).await
    }

    async fn contains(&mut self, candidate: &Node) -> ServiceResult<bool> {
        super::contains(self.session, &candidate.id).await
    }
}
