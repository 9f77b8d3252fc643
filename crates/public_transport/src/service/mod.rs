use async_trait::async_trait;
use log::{debug, warn};
use model::{Resource, ResourceKind};
use utility::id::Id;

use crate::{
    database::{self, Database, DatabaseError, Repo},
    session::Session,
    ServiceError, ServiceResult,
};

pub mod node;
pub mod route;
pub mod route_stop;
pub mod stop;
pub mod transport_type;

pub use node::NodeService;
pub use route::RouteService;
pub use route_stop::RouteStopService;
pub use stop::StopService;
pub use transport_type::TypeService;

/// The operations every kind of resource supports, whatever its key looks
/// like. Each mutating call commits before it returns.
#[async_trait]
pub trait ResourceService {
    type Resource: Resource;

    async fn list(&mut self) -> ServiceResult<Vec<Self::Resource>>;

    async fn get(&mut self, id: &Id<Self::Resource>) -> ServiceResult<Self::Resource>;

    /// Inserts `new` or overwrites the resource with the same identity, then
    /// returns what was stored.
    async fn update(&mut self, new: Self::Resource) -> ServiceResult<Self::Resource>;

    async fn delete(&mut self, id: &Id<Self::Resource>) -> ServiceResult<()>;

    /// Looks at the identity of `candidate` only.
    async fn contains(&mut self, candidate: &Self::Resource) -> ServiceResult<bool>;
}

pub(crate) fn not_found<R: Resource>(id: &Id<R>) -> ServiceError {
    ServiceError::ResourceNotFound {
        kind: R::KIND,
        identifier: R::describe(id),
    }
}

pub(crate) fn already_exists<R: Resource>(id: &Id<R>) -> ServiceError {
    ServiceError::ResourceAlreadyExists {
        kind: R::KIND,
        identifier: R::describe(id),
    }
}

/// Constraint violations become `DatabaseIntegrityViolated`, anything else is
/// fatal.
pub(crate) fn write_failed(kind: ResourceKind, why: DatabaseError) -> ServiceError {
    match why {
        DatabaseError::Integrity(details) => {
            warn!("rejected write of {kind}: {details}");
            ServiceError::DatabaseIntegrityViolated { kind, details }
        }
        other => ServiceError::Fatal(other),
    }
}

/// Commits a successful write, rolls back a failed one.
pub(crate) async fn finish<T, D>(
    session: &mut Session<D>,
    kind: ResourceKind,
    written: database::Result<T>,
) -> ServiceResult<T>
where
    D: Database,
{
    match written {
        Ok(value) => {
            session
                .commit()
                .await
                .map_err(|why| write_failed(kind, why))?;
            Ok(value)
        }
        Err(why) => {
            session.rollback();
            Err(write_failed(kind, why))
        }
    }
}

pub(crate) async fn list<R, D>(session: &mut Session<D>) -> ServiceResult<Vec<R>>
where
    R: Resource,
    D: Database,
    D::Transaction: Repo<R>,
{
    Ok(Repo::<R>::get_all(session.tx().await?).await?)
}

pub(crate) async fn get<R, D>(session: &mut Session<D>, id: &Id<R>) -> ServiceResult<R>
where
    R: Resource,
    D: Database,
    D::Transaction: Repo<R>,
{
    Repo::<R>::get(session.tx().await?, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub(crate) async fn contains<R, D>(session: &mut Session<D>, id: &Id<R>) -> ServiceResult<bool>
where
    R: Resource,
    D: Database,
    D::Transaction: Repo<R>,
{
    Ok(Repo::<R>::exists(session.tx().await?, id).await?)
}

pub(crate) async fn upsert<R, D>(session: &mut Session<D>, new: R) -> ServiceResult<R>
where
    R: Resource,
    D: Database,
    D::Transaction: Repo<R>,
{
    let id = new.id();
    debug!("writing {} {}", R::KIND, R::describe(&id));
    let written = Repo::<R>::put(session.tx().await?, &new).await;
    finish(session, R::KIND, written).await?;
    // read back what was committed
    get(session, &id).await
}

pub(crate) async fn delete<R, D>(session: &mut Session<D>, id: &Id<R>) -> ServiceResult<()>
where
    R: Resource,
    D: Database,
    D::Transaction: Repo<R>,
{
    if !contains(session, id).await? {
        return Err(not_found(id));
    }
    debug!("deleting {} {}", R::KIND, R::describe(id));
    match Repo::<R>::delete(session.tx().await?, id).await {
        Err(DatabaseError::NotFound) => {
            session.rollback();
            Err(not_found(id))
        }
        deleted => finish(session, R::KIND, deleted).await,
    }
}
