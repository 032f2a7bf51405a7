//! Passes Repository

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use passage::{
    identities::{TerritoryUuid, UserUuid},
    passes::{Pass, PassUuid},
};

use crate::domain::errors::RepositoryError;

/// Durable pass storage.
///
/// Writes are versioned: `update_pass` applies only when the stored version
/// equals `expected_version`, otherwise it fails with
/// [`RepositoryError::StaleVersion`]. Writes that leave a pass active must
/// re-check overlap against the stored passes of the same user inside the
/// write and fail with [`RepositoryError::Overlap`] on a collision.
#[automock]
#[async_trait]
pub trait PassesRepository: Send + Sync {
    /// Load a single pass.
    async fn find_pass(&self, pass: PassUuid) -> Result<Option<Pass>, RepositoryError>;

    /// All passes issued by `user`.
    async fn list_user_passes(&self, user: UserUuid) -> Result<Vec<Pass>, RepositoryError>;

    /// All passes for `territory`.
    async fn list_territory_passes(
        &self,
        territory: TerritoryUuid,
    ) -> Result<Vec<Pass>, RepositoryError>;

    /// Active passes whose validity window closed at or before `now`.
    async fn list_elapsed_active_passes(
        &self,
        now: Timestamp,
    ) -> Result<Vec<Pass>, RepositoryError>;

    /// Whether `user` may issue passes for `territory`.
    async fn has_territory_relation(
        &self,
        user: UserUuid,
        territory: TerritoryUuid,
    ) -> Result<bool, RepositoryError>;

    /// Persist a new pass.
    async fn insert_pass(&self, pass: &Pass) -> Result<(), RepositoryError>;

    /// Overwrite a stored pass.
    async fn update_pass(&self, pass: &Pass, expected_version: u64)
    -> Result<(), RepositoryError>;
}
