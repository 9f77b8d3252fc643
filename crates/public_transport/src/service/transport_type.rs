use async_trait::async_trait;
use log::debug;
use model::{ResourceKind, TransportType};
use utility::id::Id;

use super::{already_exists, not_found, ResourceService};
use crate::{
    database::{Database, TypeRepo},
    session::Session,
    ServiceResult,
};

pub struct TypeService<'s, D: Database> {
    session: &'s mut Session<D>,
}

impl<'s, D: Database> TypeService<'s, D> {
    pub fn new(session: &'s mut Session<D>) -> Self {
        Self { session }
    }

    /// Unlike [`ResourceService::update`] this refuses to touch a type that
    /// is already there.
    pub async fn create(&mut self, new: TransportType) -> ServiceResult<TransportType> {
        if self.contains(&new).await? {
            return Err(already_exists(&new.name));
        }
        debug!("creating type {}", new.name);
        let inserted = TypeRepo::insert(self.session.tx().await?, &new).await;
        super::finish(self.session, ResourceKind::Type, inserted).await
    }

    /// Gives the type `name` the name of `new`. Types still used by a route
    /// can not be renamed.
    pub async fn rename(
        &mut self,
        name: &Id<TransportType>,
        new: TransportType,
    ) -> ServiceResult<TransportType> {
        if !super::contains(self.session, name).await? {
            return Err(not_found(name));
        }
        if *name != new.name && self.contains(&new).await? {
            return Err(already_exists(&new.name));
        }
        debug!("renaming type {name} to {}", new.name);
        let renamed = TypeRepo::rename(self.session.tx().await?, name, &new).await;
        super::finish(self.session, ResourceKind::Type, renamed).await
    }
}

#[async_trait]
impl<'s, D: Database> ResourceService for TypeService<'s, D> {
    type Resource = TransportType;

    async fn list(&mut self) -> ServiceResult<Vec<TransportType>> {
        super::list(self.session).await
    }

    async fn get(&mut self, id: &Id<TransportType>) -> ServiceResult<TransportType> {
        super::get(self.session, id).await
    }

    async fn update(&mut self, new: TransportType) -> ServiceResult<TransportType> {
        super::upsert(self.session, new).await
    }

    async fn delete(&mut self, id: &Id<TransportType>) -> ServiceResult<()> {
        super::delete(self.session, id).await
    }

    async fn contains(&mut self, candidate: &TransportType) -> ServiceResult<bool> {
        super::contains(self.session, &candidate.name).await
    }
}
