//! Shared domain errors.

use passage::passes::PassUuid;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Failures reported by the pass, crossing and checkpoint stores.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The pass changed since it was read; the write was not applied.
    #[error("pass {0} was modified concurrently")]
    StaleVersion(PassUuid),

    /// The write would leave two overlapping active passes.
    #[error("pass overlaps active pass {0}")]
    Overlap(PassUuid),

    /// A record with the same identifier already exists.
    #[error("record already exists")]
    AlreadyExists,

    /// A referenced record does not exist.
    #[error("related resource not found")]
    InvalidReference,

    /// A stored value could not be interpreted.
    #[error("invalid data")]
    InvalidData,

    /// Any other storage failure.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for RepositoryError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

/// How a caller should treat a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A referenced pass, checkpoint, user or territory is absent.
    NotFound,

    /// The user lacks the territory relation the request needs.
    Forbidden,

    /// The request collides with existing state; resubmit with other data.
    Conflict,

    /// The pass is in the wrong status for the request.
    StateViolation,

    /// The pass and checkpoint do not fit together.
    Compatibility,

    /// The request data itself is malformed.
    Invalid,

    /// Deployment or configuration defect; needs an operator.
    Fatal,

    /// Storage failure.
    Infrastructure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_a_plain_storage_error() {
        let error = RepositoryError::from(Error::RowNotFound);

        assert!(matches!(error, RepositoryError::Sql(Error::RowNotFound)));
    }

    #[test]
    fn pool_timeouts_are_storage_errors() {
        let error = RepositoryError::from(Error::PoolTimedOut);

        assert!(matches!(error, RepositoryError::Sql(Error::PoolTimedOut)));
    }
}
