//! In-memory store, used by service tests and embedders without a database.

use async_trait::async_trait;
use jiff::Timestamp;
use passage::{
    checkpoints::{Checkpoint, CheckpointUuid},
    crossings::Crossing,
    identities::{TerritoryUuid, UserUuid},
    overlap,
    passes::{Pass, PassStatus, PassUuid},
};
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::Mutex;

use crate::domain::{
    checkpoints::CheckpointsRepository, crossings::CrossingsRepository, errors::RepositoryError,
    passes::PassesRepository,
};

#[derive(Debug, Default)]
struct State {
    passes: FxHashMap<PassUuid, Pass>,
    crossings: Vec<Crossing>,
    checkpoints: FxHashMap<CheckpointUuid, Checkpoint>,
    relations: FxHashSet<(UserUuid, TerritoryUuid)>,
}

impl State {
    fn ensure_version(&self, pass: &Pass, expected_version: u64) -> Result<(), RepositoryError> {
        match self.passes.get(&pass.uuid) {
            Some(stored) if stored.version == expected_version => Ok(()),
            _ => Err(RepositoryError::StaleVersion(pass.uuid)),
        }
    }

    fn ensure_no_overlap(&self, pass: &Pass) -> Result<(), RepositoryError> {
        if pass.status != PassStatus::Active {
            return Ok(());
        }

        match overlap::find_conflict(pass, self.passes.values()) {
            Some(existing) => Err(RepositoryError::Overlap(existing.uuid)),
            None => Ok(()),
        }
    }

    fn collect_passes(&self, keep: impl Fn(&Pass) -> bool) -> Vec<Pass> {
        let mut passes: Vec<Pass> = self.passes.values().filter(|p| keep(p)).cloned().collect();

        passes.sort_by_key(|pass| (pass.window.start(), pass.uuid));

        passes
    }
}

/// Every repository held in one mutex-guarded map set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a checkpoint.
    pub async fn add_checkpoint(&self, checkpoint: Checkpoint) {
        self.state
            .lock()
            .await
            .checkpoints
            .insert(checkpoint.uuid, checkpoint);
    }

    /// Allow `user` to issue passes for `territory`.
    pub async fn grant_territory(&self, user: UserUuid, territory: TerritoryUuid) {
        self.state.lock().await.relations.insert((user, territory));
    }
}

#[async_trait]
impl PassesRepository for MemoryStore {
    async fn find_pass(&self, pass: PassUuid) -> Result<Option<Pass>, RepositoryError> {
        Ok(self.state.lock().await.passes.get(&pass).cloned())
    }

    async fn list_user_passes(&self, user: UserUuid) -> Result<Vec<Pass>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .collect_passes(|pass| pass.user_uuid == user))
    }

    async fn list_territory_passes(
        &self,
        territory: TerritoryUuid,
    ) -> Result<Vec<Pass>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .collect_passes(|pass| pass.territory_uuid == territory))
    }

    async fn list_elapsed_active_passes(
        &self,
        now: Timestamp,
    ) -> Result<Vec<Pass>, RepositoryError> {
        Ok(self.state.lock().await.collect_passes(|pass| pass.is_due(now)))
    }

    async fn has_territory_relation(
        &self,
        user: UserUuid,
        territory: TerritoryUuid,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .relations
            .contains(&(user, territory)))
    }

    async fn insert_pass(&self, pass: &Pass) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;

        if state.passes.contains_key(&pass.uuid) {
            return Err(RepositoryError::AlreadyExists);
        }

        state.ensure_no_overlap(pass)?;
        state.passes.insert(pass.uuid, pass.clone());

        Ok(())
    }

    async fn update_pass(&self, pass: &Pass, expected_version: u64) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;

        state.ensure_version(pass, expected_version)?;
        state.ensure_no_overlap(pass)?;
        state.passes.insert(pass.uuid, pass.clone());

        Ok(())
    }
}

#[async_trait]
impl CrossingsRepository for MemoryStore {
    async fn list_pass_crossings(&self, pass: PassUuid) -> Result<Vec<Crossing>, RepositoryError> {
        let mut crossings: Vec<Crossing> = self
            .state
            .lock()
            .await
            .crossings
            .iter()
            .filter(|crossing| crossing.pass_uuid == pass)
            .cloned()
            .collect();

        crossings.sort_by_key(|crossing| crossing.performed_at);

        Ok(crossings)
    }

    async fn find_latest_crossing(
        &self,
        pass: PassUuid,
    ) -> Result<Option<Crossing>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .crossings
            .iter()
            .filter(|crossing| crossing.pass_uuid == pass)
            .max_by_key(|crossing| crossing.performed_at)
            .cloned())
    }

    async fn record_crossing(
        &self,
        pass: &Pass,
        expected_version: u64,
        crossing: &Crossing,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;

        state.ensure_version(pass, expected_version)?;

        if state.crossings.iter().any(|c| c.uuid == crossing.uuid) {
            return Err(RepositoryError::AlreadyExists);
        }

        state.passes.insert(pass.uuid, pass.clone());
        state.crossings.push(crossing.clone());

        Ok(())
    }
}

#[async_trait]
impl CheckpointsRepository for MemoryStore {
    async fn find_checkpoint(
        &self,
        checkpoint: CheckpointUuid,
    ) -> Result<Option<Checkpoint>, RepositoryError> {
        Ok(self.state.lock().await.checkpoints.get(&checkpoint).cloned())
    }
}
