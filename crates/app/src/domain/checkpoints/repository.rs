//! Checkpoints Repository

use async_trait::async_trait;
use mockall::automock;
use passage::checkpoints::{Checkpoint, CheckpointUuid};

use crate::domain::errors::RepositoryError;

/// Read-only checkpoint lookup.
#[automock]
#[async_trait]
pub trait CheckpointsRepository: Send + Sync {
    /// Load a single checkpoint.
    async fn find_checkpoint(
        &self,
        checkpoint: CheckpointUuid,
    ) -> Result<Option<Checkpoint>, RepositoryError>;
}
