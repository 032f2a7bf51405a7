//! Passes service errors.

use passage::{
    identities::{TerritoryUuid, UserUuid},
    lifecycle::TransitionError,
    passes::{InvalidWindow, PassUuid},
};
use thiserror::Error;

use crate::domain::errors::{ErrorClass, RepositoryError};

#[derive(Debug, Error)]
pub enum PassesServiceError {
    #[error("pass {0} not found")]
    NotFound(PassUuid),

    #[error("pass already exists")]
    AlreadyExists,

    #[error("user {user} may not issue passes for territory {territory}")]
    PermissionDenied {
        user: UserUuid,
        territory: TerritoryUuid,
    },

    #[error("pass conflicts with active pass {0}")]
    ConflictingPass(PassUuid),

    #[error(transparent)]
    InvalidWindow(#[from] InvalidWindow),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("pass {0} was modified concurrently")]
    ConcurrentModification(PassUuid),

    #[error("storage error")]
    Repository(#[source] RepositoryError),
}

impl PassesServiceError {
    /// How callers should treat this failure.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::PermissionDenied { .. } => ErrorClass::Forbidden,
            Self::AlreadyExists | Self::ConflictingPass(_) | Self::ConcurrentModification(_) => {
                ErrorClass::Conflict
            }
            Self::InvalidWindow(_) => ErrorClass::Invalid,
            Self::Transition(_) => ErrorClass::StateViolation,
            Self::Repository(_) => ErrorClass::Infrastructure,
        }
    }
}

impl From<RepositoryError> for PassesServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Overlap(existing) => Self::ConflictingPass(existing),
            RepositoryError::StaleVersion(pass) => Self::ConcurrentModification(pass),
            RepositoryError::AlreadyExists => Self::AlreadyExists,
            other => Self::Repository(other),
        }
    }
}
