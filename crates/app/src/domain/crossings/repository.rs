//! Crossings Repository

use async_trait::async_trait;
use mockall::automock;
use passage::{
    crossings::Crossing,
    passes::{Pass, PassUuid},
};

use crate::domain::errors::RepositoryError;

/// Append-only crossing log.
#[automock]
#[async_trait]
pub trait CrossingsRepository: Send + Sync {
    /// Crossings of `pass`, oldest first.
    async fn list_pass_crossings(&self, pass: PassUuid) -> Result<Vec<Crossing>, RepositoryError>;

    /// Most recent crossing of `pass` by `performed_at`, ties going to the one
    /// recorded last.
    async fn find_latest_crossing(
        &self,
        pass: PassUuid,
    ) -> Result<Option<Crossing>, RepositoryError>;

    /// Store `crossing` and the pass it changed as one unit: either both are
    /// written or neither is. The pass write follows the same version rule as
    /// [`PassesRepository::update_pass`](crate::domain::passes::PassesRepository::update_pass).
    async fn record_crossing(
        &self,
        pass: &Pass,
        expected_version: u64,
        crossing: &Crossing,
    ) -> Result<(), RepositoryError>;
}
