//! Pass type processors
//!
//! Each [`TimeType`] has a processor deciding whether a crossing is allowed and
//! what it does to the pass status. Processors run against an in-memory copy of
//! an active pass; the caller persists the result only when processing succeeds.

use std::fmt::Debug;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    crossings::{Crossing, Direction},
    passes::{Pass, PassStatus, PassUuid, TimeType},
};

/// Result of a successful processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    /// The crossing matched what the pass expected.
    Accepted,

    /// The crossing was allowed but went the other way than expected, e.g. two
    /// entries in a row on a permanent pass.
    UnexpectedDirection {
        /// Direction the pass expected.
        expected: Direction,

        /// Direction actually taken.
        actual: Direction,
    },
}

/// Crossing refused by a processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// A one-time pass was presented for a second entry.
    #[error("pass {0} has already been used")]
    AlreadyUsed(PassUuid),
}

/// Crossing rules for one [`TimeType`].
pub trait PassTypeProcessor: Debug + Send + Sync {
    /// The time type this processor handles.
    fn time_type(&self) -> TimeType;

    /// Apply a crossing in `direction` to `pass`.
    ///
    /// `prior` is the most recent crossing already recorded for the pass.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessorError`] when the crossing must be refused.
    fn process(
        &self,
        pass: &mut Pass,
        prior: Option<&Crossing>,
        direction: Direction,
    ) -> Result<Processed, ProcessorError>;
}

/// One entry, one exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneTimeProcessor;

impl PassTypeProcessor for OneTimeProcessor {
    fn time_type(&self) -> TimeType {
        TimeType::OneTime
    }

    fn process(
        &self,
        pass: &mut Pass,
        prior: Option<&Crossing>,
        direction: Direction,
    ) -> Result<Processed, ProcessorError> {
        match direction {
            Direction::Out => {
                pass.status = PassStatus::Completed;
                Ok(Processed::Accepted)
            }
            Direction::In if prior.is_some() => Err(ProcessorError::AlreadyUsed(pass.uuid)),
            Direction::In => Ok(Processed::Accepted),
        }
    }
}

/// Unlimited crossings; repeated directions are tolerated but reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermanentProcessor;

impl PassTypeProcessor for PermanentProcessor {
    fn time_type(&self) -> TimeType {
        TimeType::Permanent
    }

    fn process(
        &self,
        pass: &mut Pass,
        _prior: Option<&Crossing>,
        direction: Direction,
    ) -> Result<Processed, ProcessorError> {
        if direction == pass.expected_direction {
            return Ok(Processed::Accepted);
        }

        Ok(Processed::UnexpectedDirection {
            expected: pass.expected_direction,
            actual: direction,
        })
    }
}

/// Processors keyed by time type, assembled once at startup.
#[derive(Debug, Default)]
pub struct ProcessorRegistry {
    processors: FxHashMap<TimeType, Box<dyn PassTypeProcessor>>,
}

impl ProcessorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a processor for every built-in time type.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(OneTimeProcessor)
            .with(PermanentProcessor)
    }

    /// Register `processor`, replacing any previous one for its time type.
    #[must_use]
    pub fn with<P>(mut self, processor: P) -> Self
    where
        P: PassTypeProcessor + 'static,
    {
        self.processors
            .insert(processor.time_type(), Box::new(processor));
        self
    }

    /// Processor for `time_type`, if one is registered.
    pub fn get(&self, time_type: TimeType) -> Option<&dyn PassTypeProcessor> {
        self.processors.get(&time_type).map(|processor| &**processor)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        checkpoints::CheckpointUuid,
        crossings::CrossingUuid,
        fixtures::{PassFixture, t0},
        identities::{TerritoryUuid, UserUuid},
    };

    use super::*;

    fn one_time_pass() -> Result<Pass, crate::passes::InvalidWindow> {
        Ok(PassFixture::vehicle(UserUuid::new(), TerritoryUuid::new(), "А420ВХ799")?.build())
    }

    fn crossing(pass: &Pass, direction: Direction) -> Crossing {
        Crossing {
            uuid: CrossingUuid::new(),
            pass_uuid: pass.uuid,
            checkpoint_uuid: CheckpointUuid::new(),
            direction,
            performed_at: t0(),
        }
    }

    #[test]
    fn one_time_first_entry_is_accepted() -> TestResult {
        let mut pass = one_time_pass()?;

        let processed = OneTimeProcessor.process(&mut pass, None, Direction::In)?;

        assert_eq!(processed, Processed::Accepted);
        assert_eq!(pass.status, PassStatus::Active);

        Ok(())
    }

    #[test]
    fn one_time_second_entry_is_refused() -> TestResult {
        let mut pass = one_time_pass()?;
        let entry = crossing(&pass, Direction::In);

        let result = OneTimeProcessor.process(&mut pass, Some(&entry), Direction::In);

        assert_eq!(result, Err(ProcessorError::AlreadyUsed(pass.uuid)));
        assert_eq!(pass.status, PassStatus::Active);

        Ok(())
    }

    #[test]
    fn one_time_exit_completes_with_or_without_entry() -> TestResult {
        let mut entered = one_time_pass()?;
        let entry = crossing(&entered, Direction::In);
        OneTimeProcessor.process(&mut entered, Some(&entry), Direction::Out)?;

        let mut never_entered = one_time_pass()?;
        OneTimeProcessor.process(&mut never_entered, None, Direction::Out)?;

        assert_eq!(entered.status, PassStatus::Completed);
        assert_eq!(never_entered.status, PassStatus::Completed);

        Ok(())
    }

    #[test]
    fn permanent_repeated_entry_is_reported_not_refused() -> TestResult {
        let mut pass = PassFixture::pedestrian(UserUuid::new(), TerritoryUuid::new(), "Guest")?
            .permanent()
            .build();
        pass.expected_direction = Direction::Out;
        let entry = crossing(&pass, Direction::In);

        let processed = PermanentProcessor.process(&mut pass, Some(&entry), Direction::In)?;

        assert_eq!(
            processed,
            Processed::UnexpectedDirection {
                expected: Direction::Out,
                actual: Direction::In,
            }
        );
        assert_eq!(pass.status, PassStatus::Active);

        Ok(())
    }

    #[test]
    fn permanent_never_changes_status() -> TestResult {
        let mut pass = PassFixture::pedestrian(UserUuid::new(), TerritoryUuid::new(), "Guest")?
            .permanent()
            .build();

        PermanentProcessor.process(&mut pass, None, Direction::In)?;
        PermanentProcessor.process(&mut pass, None, Direction::Out)?;

        assert_eq!(pass.status, PassStatus::Active);

        Ok(())
    }

    #[test]
    fn standard_registry_covers_every_time_type() {
        let registry = ProcessorRegistry::standard();

        for time_type in [TimeType::OneTime, TimeType::Permanent] {
            let processor = registry.get(time_type);

            assert_eq!(processor.map(|p| p.time_type()), Some(time_type));
        }
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        assert!(ProcessorRegistry::new().get(TimeType::OneTime).is_none());
    }
}
