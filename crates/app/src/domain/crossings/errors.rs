//! Crossings service errors.

use passage::{
    checkpoints::{CheckpointType, CheckpointUuid},
    identities::TerritoryUuid,
    passes::{PassKindTag, PassStatus, PassUuid, TimeType},
    processors::ProcessorError,
};
use thiserror::Error;

use crate::domain::errors::{ErrorClass, RepositoryError};

#[derive(Debug, Error)]
pub enum CrossingsServiceError {
    #[error("pass {0} not found")]
    PassNotFound(PassUuid),

    #[error("pass {pass} is {status}")]
    InactivePass { pass: PassUuid, status: PassStatus },

    #[error("checkpoint {0} not found")]
    CheckpointNotFound(CheckpointUuid),

    #[error("pass is for territory {pass_territory}, checkpoint belongs to {checkpoint_territory}")]
    MismatchedTerritory {
        pass_territory: TerritoryUuid,
        checkpoint_territory: TerritoryUuid,
    },

    #[error("{checkpoint_type} checkpoint does not accept {kind} passes")]
    IncompatibleCheckpoint {
        checkpoint_type: CheckpointType,
        kind: PassKindTag,
    },

    #[error("one-time pass {0} has already been used")]
    PassAlreadyUsed(PassUuid),

    #[error("no processor registered for {0} passes")]
    UnsupportedPassType(TimeType),

    #[error("pass {0} was modified concurrently")]
    ConcurrentModification(PassUuid),

    #[error("crossing already exists")]
    AlreadyExists,

    #[error("storage error")]
    Repository(#[source] RepositoryError),
}

impl CrossingsServiceError {
    /// How callers should treat this failure.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::PassNotFound(_) | Self::CheckpointNotFound(_) => ErrorClass::NotFound,
            Self::InactivePass { .. } => ErrorClass::StateViolation,
            Self::MismatchedTerritory { .. } | Self::IncompatibleCheckpoint { .. } => {
                ErrorClass::Compatibility
            }
            Self::PassAlreadyUsed(_) | Self::ConcurrentModification(_) | Self::AlreadyExists => {
                ErrorClass::Conflict
            }
            Self::UnsupportedPassType(_) => ErrorClass::Fatal,
            Self::Repository(_) => ErrorClass::Infrastructure,
        }
    }
}

impl From<RepositoryError> for CrossingsServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::StaleVersion(pass) => Self::ConcurrentModification(pass),
            RepositoryError::AlreadyExists => Self::AlreadyExists,
            other => Self::Repository(other),
        }
    }
}

impl From<ProcessorError> for CrossingsServiceError {
    fn from(error: ProcessorError) -> Self {
        match error {
            ProcessorError::AlreadyUsed(pass) => Self::PassAlreadyUsed(pass),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_pass_type_is_fatal() {
        let error = CrossingsServiceError::UnsupportedPassType(TimeType::Permanent);

        assert_eq!(error.class(), ErrorClass::Fatal);
    }

    #[test]
    fn stale_writes_become_concurrent_modification() {
        let pass = PassUuid::new();
        let error = CrossingsServiceError::from(RepositoryError::StaleVersion(pass));

        assert!(
            matches!(error, CrossingsServiceError::ConcurrentModification(p) if p == pass),
            "expected ConcurrentModification, got {error:?}"
        );
        assert_eq!(error.class(), ErrorClass::Conflict);
    }
}
