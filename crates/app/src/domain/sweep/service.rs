//! Elapsed pass sweep.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use passage::{
    lifecycle::TransitionError,
    passes::{Pass, PassStatus},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::{
    crossings::CrossingsRepository, errors::RepositoryError, passes::PassesRepository,
};

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Passes closed without ever being used.
    pub outdated: usize,

    /// Passes whose last crossing was an exit.
    pub completed: usize,

    /// Passes whose holder is still inside.
    pub warned: usize,

    /// Passes changed by someone else while being settled.
    pub skipped: usize,

    /// Passes that could not be settled.
    pub failed: usize,
}

impl SweepReport {
    /// Number of passes moved out of active.
    pub fn settled(&self) -> usize {
        self.outdated + self.completed + self.warned
    }

    fn record(&mut self, status: PassStatus) {
        match status {
            PassStatus::Outdated => self.outdated += 1,
            PassStatus::Completed => self.completed += 1,
            PassStatus::Warning => self.warned += 1,
            PassStatus::Active | PassStatus::Cancelled => {}
        }
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to list elapsed passes")]
    Listing(#[source] RepositoryError),
}

#[derive(Debug, Error)]
enum SettleError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Closes active passes whose validity window has elapsed.
#[derive(Clone)]
pub struct PassSweeper {
    passes: Arc<dyn PassesRepository>,
    crossings: Arc<dyn CrossingsRepository>,
}

impl PassSweeper {
    #[must_use]
    pub fn new(passes: Arc<dyn PassesRepository>, crossings: Arc<dyn CrossingsRepository>) -> Self {
        Self { passes, crossings }
    }

    async fn settle(&self, mut pass: Pass, now: Timestamp) -> Result<PassStatus, SettleError> {
        let last_direction = self
            .crossings
            .find_latest_crossing(pass.uuid)
            .await?
            .map(|crossing| crossing.direction);

        let expected_version = pass.version;
        let status = pass.settle(now, last_direction)?;

        pass.touch(now);
        self.passes.update_pass(&pass, expected_version).await?;

        debug!(pass = %pass.uuid, %status, "pass settled");

        Ok(status)
    }
}

#[async_trait]
impl SweepService for PassSweeper {
    async fn sweep(&self, now: Timestamp) -> Result<SweepReport, SweepError> {
        let due = self
            .passes
            .list_elapsed_active_passes(now)
            .await
            .map_err(SweepError::Listing)?;

        let mut report = SweepReport::default();

        for pass in due {
            let uuid = pass.uuid;

            match self.settle(pass, now).await {
                Ok(status) => report.record(status),
                Err(
                    SettleError::Repository(RepositoryError::StaleVersion(_))
                    | SettleError::Transition(_),
                ) => {
                    debug!(pass = %uuid, "pass changed during sweep, skipping");
                    report.skipped += 1;
                }
                Err(SettleError::Repository(source)) => {
                    error!(pass = %uuid, error = %source, "failed to settle elapsed pass");
                    report.failed += 1;
                }
            }
        }

        if report.settled() > 0 || report.failed > 0 {
            info!(
                outdated = report.outdated,
                completed = report.completed,
                warned = report.warned,
                skipped = report.skipped,
                failed = report.failed,
                "sweep finished"
            );
        }

        Ok(report)
    }
}

#[automock]
#[async_trait]
pub trait SweepService: Send + Sync {
    /// Settle every active pass whose window closed at or before `now`.
    async fn sweep(&self, now: Timestamp) -> Result<SweepReport, SweepError>;
}
