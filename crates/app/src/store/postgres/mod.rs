//! `PostgreSQL` store.
//!
//! Each repository call runs in its own transaction. Writes that can leave a
//! pass active take a per-user advisory lock and re-run overlap detection
//! against the committed passes before writing, so two overlapping passes can
//! never both commit. Pass writes are compare-and-set on `version`.

use async_trait::async_trait;
use jiff::Timestamp;
use passage::{
    checkpoints::{Checkpoint, CheckpointUuid},
    crossings::Crossing,
    identities::{TerritoryUuid, UserUuid},
    overlap,
    passes::{Pass, PassStatus, PassUuid},
};
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        checkpoints::CheckpointsRepository, crossings::CrossingsRepository,
        errors::RepositoryError, passes::PassesRepository,
    },
};

use self::{
    checkpoints::PgCheckpointsRepository, crossings::PgCrossingsRepository,
    passes::PgPassesRepository,
};

mod checkpoints;
mod crossings;
mod passes;
mod rows;

#[derive(Debug, Clone)]
pub struct PgStore {
    db: Db,
    passes: PgPassesRepository,
    crossings: PgCrossingsRepository,
    checkpoints: PgCheckpointsRepository,
}

impl PgStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            passes: PgPassesRepository,
            crossings: PgCrossingsRepository,
            checkpoints: PgCheckpointsRepository,
        }
    }

    /// Register a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::AlreadyExists`] for a duplicate UUID.
    pub async fn add_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await?;

        self.checkpoints.insert_checkpoint(&mut tx, checkpoint).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Allow `user` to issue passes for `territory`. Granting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    pub async fn grant_territory(
        &self,
        user: UserUuid,
        territory: TerritoryUuid,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await?;

        self.passes.grant_territory(&mut tx, user, territory).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn ensure_no_overlap(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pass: &Pass,
    ) -> Result<(), RepositoryError> {
        if pass.status != PassStatus::Active {
            return Ok(());
        }

        self.passes.lock_user_passes(tx, pass.user_uuid).await?;

        let existing = self.passes.list_user_passes(tx, pass.user_uuid).await?;

        match overlap::find_conflict(pass, &existing) {
            Some(conflict) => Err(RepositoryError::Overlap(conflict.uuid)),
            None => Ok(()),
        }
    }

    async fn write_pass(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pass: &Pass,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        if self.passes.update_pass(tx, pass, expected_version).await? == 0 {
            return Err(RepositoryError::StaleVersion(pass.uuid));
        }

        Ok(())
    }
}

#[async_trait]
impl PassesRepository for PgStore {
    async fn find_pass(&self, pass: PassUuid) -> Result<Option<Pass>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let pass = self.passes.find_pass(&mut tx, pass).await?;

        tx.commit().await?;

        Ok(pass)
    }

    async fn list_user_passes(&self, user: UserUuid) -> Result<Vec<Pass>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let passes = self.passes.list_user_passes(&mut tx, user).await?;

        tx.commit().await?;

        Ok(passes)
    }

    async fn list_territory_passes(
        &self,
        territory: TerritoryUuid,
    ) -> Result<Vec<Pass>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let passes = self.passes.list_territory_passes(&mut tx, territory).await?;

        tx.commit().await?;

        Ok(passes)
    }

    async fn list_elapsed_active_passes(
        &self,
        now: Timestamp,
    ) -> Result<Vec<Pass>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let passes = self.passes.list_elapsed_active_passes(&mut tx, now).await?;

        tx.commit().await?;

        Ok(passes)
    }

    async fn has_territory_relation(
        &self,
        user: UserUuid,
        territory: TerritoryUuid,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let related = self
            .passes
            .has_territory_relation(&mut tx, user, territory)
            .await?;

        tx.commit().await?;

        Ok(related)
    }

    async fn insert_pass(&self, pass: &Pass) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await?;

        self.ensure_no_overlap(&mut tx, pass).await?;
        self.passes.insert_pass(&mut tx, pass).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn update_pass(&self, pass: &Pass, expected_version: u64) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await?;

        self.ensure_no_overlap(&mut tx, pass).await?;
        self.write_pass(&mut tx, pass, expected_version).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl CrossingsRepository for PgStore {
    async fn list_pass_crossings(&self, pass: PassUuid) -> Result<Vec<Crossing>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let crossings = self.crossings.list_pass_crossings(&mut tx, pass).await?;

        tx.commit().await?;

        Ok(crossings)
    }

    async fn find_latest_crossing(
        &self,
        pass: PassUuid,
    ) -> Result<Option<Crossing>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let crossing = self.crossings.find_latest_crossing(&mut tx, pass).await?;

        tx.commit().await?;

        Ok(crossing)
    }

    async fn record_crossing(
        &self,
        pass: &Pass,
        expected_version: u64,
        crossing: &Crossing,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await?;

        self.write_pass(&mut tx, pass, expected_version).await?;
        self.crossings.insert_crossing(&mut tx, crossing).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl CheckpointsRepository for PgStore {
    async fn find_checkpoint(
        &self,
        checkpoint: CheckpointUuid,
    ) -> Result<Option<Checkpoint>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let checkpoint = self.checkpoints.find_checkpoint(&mut tx, checkpoint).await?;

        tx.commit().await?;

        Ok(checkpoint)
    }
}
