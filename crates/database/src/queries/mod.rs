use public_transport::database::DatabaseError;
use sqlx::error::ErrorKind;

pub mod node;
pub mod route;
pub mod route_stop;
pub mod stop;
pub mod transport_type;

pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Database(ref error) if is_integrity_violation(error.kind()) => {
            let details = match error.constraint() {
                Some(constraint) => format!("{} ({constraint})", error.message()),
                None => error.message().to_owned(),
            };
            DatabaseError::Integrity(details)
        }
        _ => DatabaseError::Other(Box::new(why)),
    }
}

/// SQLSTATE class 23.
fn is_integrity_violation(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation
    )
}
