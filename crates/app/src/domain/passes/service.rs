//! Passes service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use passage::{
    identities::{TerritoryUuid, UserUuid},
    overlap,
    passes::{Pass, PassDraft, PassUuid, ValidityWindow},
};
use tracing::{info, warn};

use crate::domain::{
    crossings::CrossingsRepository,
    passes::{
        data::{NewPass, PassUpdate},
        errors::PassesServiceError,
        repository::PassesRepository,
    },
};

/// Owns every pass status change that is not caused by a crossing.
#[derive(Clone)]
pub struct PassLifecycleService {
    passes: Arc<dyn PassesRepository>,
    crossings: Arc<dyn CrossingsRepository>,
}

impl PassLifecycleService {
    #[must_use]
    pub fn new(passes: Arc<dyn PassesRepository>, crossings: Arc<dyn CrossingsRepository>) -> Self {
        Self { passes, crossings }
    }

    async fn ensure_no_conflict(&self, pass: &Pass) -> Result<(), PassesServiceError> {
        let existing = self.passes.list_user_passes(pass.user_uuid).await?;

        if let Some(conflict) = overlap::find_conflict(pass, &existing) {
            warn!(
                pass = %pass.uuid,
                conflicting = %conflict.uuid,
                "pass overlaps an active pass"
            );

            return Err(PassesServiceError::ConflictingPass(conflict.uuid));
        }

        Ok(())
    }
}

#[async_trait]
impl PassesService for PassLifecycleService {
    async fn get_pass(&self, pass: PassUuid) -> Result<Pass, PassesServiceError> {
        self.passes
            .find_pass(pass)
            .await?
            .ok_or(PassesServiceError::NotFound(pass))
    }

    async fn list_user_passes(&self, user: UserUuid) -> Result<Vec<Pass>, PassesServiceError> {
        Ok(self.passes.list_user_passes(user).await?)
    }

    async fn list_territory_passes(
        &self,
        territory: TerritoryUuid,
    ) -> Result<Vec<Pass>, PassesServiceError> {
        Ok(self.passes.list_territory_passes(territory).await?)
    }

    async fn create_pass(&self, pass: NewPass, now: Timestamp) -> Result<Pass, PassesServiceError> {
        let window = ValidityWindow::new(pass.starts_at, pass.ends_at)?;

        if !self
            .passes
            .has_territory_relation(pass.user_uuid, pass.territory_uuid)
            .await?
        {
            warn!(
                user = %pass.user_uuid,
                territory = %pass.territory_uuid,
                "pass creation denied without territory relation"
            );

            return Err(PassesServiceError::PermissionDenied {
                user: pass.user_uuid,
                territory: pass.territory_uuid,
            });
        }

        let pass = Pass::issue(
            PassDraft {
                uuid: pass.uuid,
                user_uuid: pass.user_uuid,
                territory_uuid: pass.territory_uuid,
                kind: pass.kind,
                time_type: pass.time_type,
                window,
                note: pass.note,
            },
            now,
        );

        self.ensure_no_conflict(&pass).await?;
        self.passes.insert_pass(&pass).await?;

        info!(
            pass = %pass.uuid,
            user = %pass.user_uuid,
            kind = %pass.kind.tag(),
            time_type = %pass.time_type,
            "pass issued"
        );

        Ok(pass)
    }

    async fn update_pass(
        &self,
        pass: PassUuid,
        update: PassUpdate,
        now: Timestamp,
    ) -> Result<Pass, PassesServiceError> {
        let mut pass = self.get_pass(pass).await?;
        pass.ensure_active()?;

        let expected_version = pass.version;

        pass.window = ValidityWindow::new(update.starts_at, update.ends_at)?;
        pass.note = update.note;

        self.ensure_no_conflict(&pass).await?;

        pass.touch(now);
        self.passes.update_pass(&pass, expected_version).await?;

        info!(pass = %pass.uuid, "pass updated");

        Ok(pass)
    }

    async fn cancel_pass(
        &self,
        pass: PassUuid,
        now: Timestamp,
    ) -> Result<Pass, PassesServiceError> {
        let mut pass = self.get_pass(pass).await?;
        pass.ensure_active()?;

        let used = self
            .crossings
            .find_latest_crossing(pass.uuid)
            .await?
            .is_some();

        let expected_version = pass.version;
        let status = pass.cancel(used)?;

        pass.touch(now);
        self.passes.update_pass(&pass, expected_version).await?;

        info!(pass = %pass.uuid, %status, used, "pass cancelled");

        Ok(pass)
    }

    async fn reactivate_pass(
        &self,
        pass: PassUuid,
        now: Timestamp,
    ) -> Result<Pass, PassesServiceError> {
        let mut pass = self.get_pass(pass).await?;
        let expected_version = pass.version;

        pass.reactivate(now)?;
        self.ensure_no_conflict(&pass).await?;

        pass.touch(now);
        self.passes.update_pass(&pass, expected_version).await?;

        info!(pass = %pass.uuid, "pass reactivated");

        Ok(pass)
    }

    async fn unwarn_pass(
        &self,
        pass: PassUuid,
        now: Timestamp,
    ) -> Result<Pass, PassesServiceError> {
        let mut pass = self.get_pass(pass).await?;
        let expected_version = pass.version;

        pass.clear_warning()?;

        pass.touch(now);
        self.passes.update_pass(&pass, expected_version).await?;

        info!(pass = %pass.uuid, "pass warning cleared");

        Ok(pass)
    }
}

#[automock]
#[async_trait]
pub trait PassesService: Send + Sync {
    /// Retrieve a single pass.
    async fn get_pass(&self, pass: PassUuid) -> Result<Pass, PassesServiceError>;

    /// Passes issued by a user.
    async fn list_user_passes(&self, user: UserUuid) -> Result<Vec<Pass>, PassesServiceError>;

    /// Passes granting access to a territory.
    async fn list_territory_passes(
        &self,
        territory: TerritoryUuid,
    ) -> Result<Vec<Pass>, PassesServiceError>;

    /// Issue a new active pass after permission and overlap checks.
    async fn create_pass(&self, pass: NewPass, now: Timestamp) -> Result<Pass, PassesServiceError>;

    /// Change the window or note of an active pass.
    async fn update_pass(
        &self,
        pass: PassUuid,
        update: PassUpdate,
        now: Timestamp,
    ) -> Result<Pass, PassesServiceError>;

    /// Withdraw an active pass; a used pass is completed instead.
    async fn cancel_pass(&self, pass: PassUuid, now: Timestamp) -> Result<Pass, PassesServiceError>;

    /// Return a cancelled pass to service while its window is open.
    async fn reactivate_pass(
        &self,
        pass: PassUuid,
        now: Timestamp,
    ) -> Result<Pass, PassesServiceError>;

    /// Acknowledge a warning, completing the pass.
    async fn unwarn_pass(&self, pass: PassUuid, now: Timestamp) -> Result<Pass, PassesServiceError>;
}
