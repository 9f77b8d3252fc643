use database::DatabaseError;
use model::ResourceKind;

pub mod database;
pub mod memory;
pub mod network;
pub mod placement;
pub mod service;
pub mod session;

/// The failures a caller of a service is expected to handle. Anything else is
/// carried unmodified in [`ServiceError::Fatal`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{kind} {identifier} does not exist")]
    ResourceNotFound {
        kind: ResourceKind,
        identifier: String,
    },
    #[error("{kind} {identifier} already exists")]
    ResourceAlreadyExists {
        kind: ResourceKind,
        identifier: String,
    },
    #[error("writing {kind} violates database integrity: {details}")]
    DatabaseIntegrityViolated { kind: ResourceKind, details: String },
    #[error(transparent)]
    Fatal(#[from] DatabaseError),
}

impl ServiceError {
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Self::ResourceNotFound { kind, .. }
            | Self::ResourceAlreadyExists { kind, .. }
            | Self::DatabaseIntegrityViolated { kind, .. } => Some(*kind),
            Self::Fatal(_) => None,
        }
    }
}

pub type ServiceResult<O> = Result<O, ServiceError>;
