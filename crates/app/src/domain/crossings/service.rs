//! Crossings service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use passage::{
    crossings::Crossing,
    passes::PassUuid,
    processors::{Processed, ProcessorRegistry},
};
use tracing::{debug, error, info, warn};

use crate::domain::{
    checkpoints::CheckpointsRepository,
    crossings::{data::NewCrossing, errors::CrossingsServiceError, repository::CrossingsRepository},
    passes::PassesRepository,
};

/// Attempts made when the pass changes between reading and writing it.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Validates crossings against the pass and checkpoint, dispatches them to the
/// processor for the pass time type and records the outcome.
#[derive(Clone)]
pub struct CrossingCoordinator {
    passes: Arc<dyn PassesRepository>,
    crossings: Arc<dyn CrossingsRepository>,
    checkpoints: Arc<dyn CheckpointsRepository>,
    processors: Arc<ProcessorRegistry>,
    max_attempts: u32,
}

impl CrossingCoordinator {
    /// Coordinator with the standard processors.
    #[must_use]
    pub fn new(
        passes: Arc<dyn PassesRepository>,
        crossings: Arc<dyn CrossingsRepository>,
        checkpoints: Arc<dyn CheckpointsRepository>,
    ) -> Self {
        Self {
            passes,
            crossings,
            checkpoints,
            processors: Arc::new(ProcessorRegistry::standard()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Replace the processor registry.
    #[must_use]
    pub fn with_processors(mut self, processors: ProcessorRegistry) -> Self {
        self.processors = Arc::new(processors);
        self
    }

    /// Change how often a crossing is retried after a concurrent change.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    async fn try_add_crossing(
        &self,
        new: &NewCrossing,
    ) -> Result<Crossing, CrossingsServiceError> {
        let Some(mut pass) = self.passes.find_pass(new.pass_uuid).await? else {
            return Err(CrossingsServiceError::PassNotFound(new.pass_uuid));
        };

        if pass.ensure_active().is_err() {
            return Err(CrossingsServiceError::InactivePass {
                pass: pass.uuid,
                status: pass.status,
            });
        }

        let Some(checkpoint) = self.checkpoints.find_checkpoint(new.checkpoint_uuid).await? else {
            return Err(CrossingsServiceError::CheckpointNotFound(
                new.checkpoint_uuid,
            ));
        };

        if checkpoint.territory_uuid != pass.territory_uuid {
            return Err(CrossingsServiceError::MismatchedTerritory {
                pass_territory: pass.territory_uuid,
                checkpoint_territory: checkpoint.territory_uuid,
            });
        }

        if !checkpoint.checkpoint_type.accepts(pass.kind.tag()) {
            return Err(CrossingsServiceError::IncompatibleCheckpoint {
                checkpoint_type: checkpoint.checkpoint_type,
                kind: pass.kind.tag(),
            });
        }

        let Some(processor) = self.processors.get(pass.time_type) else {
            error!(
                pass = %pass.uuid,
                time_type = %pass.time_type,
                "no processor registered for pass time type"
            );

            return Err(CrossingsServiceError::UnsupportedPassType(pass.time_type));
        };

        let prior = self.crossings.find_latest_crossing(pass.uuid).await?;
        let expected_version = pass.version;

        match processor.process(&mut pass, prior.as_ref(), new.direction)? {
            Processed::Accepted => {}
            Processed::UnexpectedDirection { expected, actual } => {
                warn!(
                    pass = %pass.uuid,
                    checkpoint = %checkpoint.uuid,
                    %expected,
                    %actual,
                    "crossing in unexpected direction"
                );
            }
        }

        pass.expect_after(new.direction);
        pass.touch(Timestamp::now());

        let crossing = Crossing {
            uuid: new.uuid,
            pass_uuid: pass.uuid,
            checkpoint_uuid: checkpoint.uuid,
            direction: new.direction,
            performed_at: new.performed_at,
        };

        self.crossings
            .record_crossing(&pass, expected_version, &crossing)
            .await?;

        info!(
            pass = %pass.uuid,
            checkpoint = %checkpoint.uuid,
            direction = %crossing.direction,
            status = %pass.status,
            "crossing recorded"
        );

        Ok(crossing)
    }
}

#[async_trait]
impl CrossingsService for CrossingCoordinator {
    async fn add_crossing(&self, crossing: NewCrossing) -> Result<Crossing, CrossingsServiceError> {
        let mut attempt = 1;

        loop {
            match self.try_add_crossing(&crossing).await {
                Err(CrossingsServiceError::ConcurrentModification(pass))
                    if attempt < self.max_attempts =>
                {
                    debug!(%pass, attempt, "pass changed while recording crossing, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn list_crossings(&self, pass: PassUuid) -> Result<Vec<Crossing>, CrossingsServiceError> {
        if self.passes.find_pass(pass).await?.is_none() {
            return Err(CrossingsServiceError::PassNotFound(pass));
        }

        Ok(self.crossings.list_pass_crossings(pass).await?)
    }
}

#[automock]
#[async_trait]
pub trait CrossingsService: Send + Sync {
    /// Validate, process and record a crossing.
    async fn add_crossing(&self, crossing: NewCrossing) -> Result<Crossing, CrossingsServiceError>;

    /// Crossings of a pass, oldest first.
    async fn list_crossings(&self, pass: PassUuid) -> Result<Vec<Crossing>, CrossingsServiceError>;
}
