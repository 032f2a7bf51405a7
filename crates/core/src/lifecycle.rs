//! Pass lifecycle
//!
//! Status transitions that are not driven by a crossing:
//!
//! ```text
//! ACTIVE    --cancel (unused)--> CANCELLED
//! ACTIVE    --cancel (used)----> COMPLETED
//! CANCELLED --reactivate-------> ACTIVE      while now < end
//! ACTIVE    --settle-----------> OUTDATED | COMPLETED | WARNING  once end has passed
//! WARNING   --clear_warning----> COMPLETED
//! ```
//!
//! Every method validates first and mutates only on success, so a rejected
//! transition leaves the pass exactly as it was.

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    crossings::Direction,
    passes::{Pass, PassStatus},
};

/// A requested transition that the current status does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Operation requires an active pass.
    #[error("pass is {status}, expected active")]
    NotActive {
        /// Current status.
        status: PassStatus,
    },

    /// Only cancelled passes can be reactivated.
    #[error("pass is {status}, expected cancelled")]
    NotCancelled {
        /// Current status.
        status: PassStatus,
    },

    /// Only passes flagged with a warning can have it cleared.
    #[error("pass is {status}, expected warning")]
    NotWarning {
        /// Current status.
        status: PassStatus,
    },

    /// The validity window already closed.
    #[error("pass expired at {ends_at}")]
    Expired {
        /// End of the validity window.
        ends_at: Timestamp,
    },

    /// The validity window is still open.
    #[error("pass is valid until {ends_at}")]
    NotElapsed {
        /// End of the validity window.
        ends_at: Timestamp,
    },
}

/// Terminal status for an active pass whose window has elapsed, given the
/// direction of its most recent crossing.
pub const fn settled_status(last_direction: Option<Direction>) -> PassStatus {
    match last_direction {
        None => PassStatus::Outdated,
        Some(Direction::Out) => PassStatus::Completed,
        Some(Direction::In) => PassStatus::Warning,
    }
}

impl Pass {
    /// Fail unless the pass may authorise a crossing.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotActive`] for any status but active.
    pub fn ensure_active(&self) -> Result<(), TransitionError> {
        if self.status == PassStatus::Active {
            Ok(())
        } else {
            Err(TransitionError::NotActive {
                status: self.status,
            })
        }
    }

    /// Withdraw the pass. A pass that has already been used cannot be
    /// un-issued, so it is closed as completed instead.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotActive`] unless the pass is active.
    pub fn cancel(&mut self, has_crossings: bool) -> Result<PassStatus, TransitionError> {
        self.ensure_active()?;

        self.status = if has_crossings {
            PassStatus::Completed
        } else {
            PassStatus::Cancelled
        };

        Ok(self.status)
    }

    /// Return a cancelled pass to service.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotCancelled`] for other statuses and
    /// [`TransitionError::Expired`] once the window has closed.
    pub fn reactivate(&mut self, now: Timestamp) -> Result<PassStatus, TransitionError> {
        if self.status != PassStatus::Cancelled {
            return Err(TransitionError::NotCancelled {
                status: self.status,
            });
        }

        if self.window.has_elapsed(now) {
            return Err(TransitionError::Expired {
                ends_at: self.window.end(),
            });
        }

        self.status = PassStatus::Active;

        Ok(self.status)
    }

    /// Acknowledge a warning, closing the pass.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotWarning`] unless the pass carries a warning.
    pub fn clear_warning(&mut self) -> Result<PassStatus, TransitionError> {
        if self.status != PassStatus::Warning {
            return Err(TransitionError::NotWarning {
                status: self.status,
            });
        }

        self.status = PassStatus::Completed;

        Ok(self.status)
    }

    /// Close an active pass whose window has elapsed, classifying it by the
    /// direction of its last crossing.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotActive`] for inactive passes and
    /// [`TransitionError::NotElapsed`] while the window is still open.
    pub fn settle(
        &mut self,
        now: Timestamp,
        last_direction: Option<Direction>,
    ) -> Result<PassStatus, TransitionError> {
        self.ensure_active()?;

        if !self.window.has_elapsed(now) {
            return Err(TransitionError::NotElapsed {
                ends_at: self.window.end(),
            });
        }

        self.status = settled_status(last_direction);

        Ok(self.status)
    }

    /// After a crossing in `taken`, the next one is expected the other way.
    pub fn expect_after(&mut self, taken: Direction) {
        self.expected_direction = taken.opposite();
    }

    /// Whether the pass is due for settling at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status == PassStatus::Active && self.window.has_elapsed(now)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        fixtures::{PassFixture, at_minutes},
        identities::{TerritoryUuid, UserUuid},
    };

    use super::*;

    fn pass() -> Result<Pass, crate::passes::InvalidWindow> {
        Ok(PassFixture::vehicle(UserUuid::new(), TerritoryUuid::new(), "А420ВХ799")?.build())
    }

    #[test]
    fn cancel_unused_pass() -> TestResult {
        let mut pass = pass()?;

        assert_eq!(pass.cancel(false)?, PassStatus::Cancelled);

        Ok(())
    }

    #[test]
    fn cancel_used_pass_completes_it() -> TestResult {
        let mut pass = pass()?;

        assert_eq!(pass.cancel(true)?, PassStatus::Completed);

        Ok(())
    }

    #[test]
    fn cancel_requires_active() -> TestResult {
        let mut pass = pass()?;
        pass.status = PassStatus::Outdated;

        let result = pass.cancel(false);

        assert_eq!(
            result,
            Err(TransitionError::NotActive {
                status: PassStatus::Outdated
            })
        );
        assert_eq!(pass.status, PassStatus::Outdated);

        Ok(())
    }

    #[test]
    fn reactivate_cancelled_pass_before_end() -> TestResult {
        let mut pass = pass()?;
        pass.cancel(false)?;

        assert_eq!(pass.reactivate(at_minutes(179))?, PassStatus::Active);

        Ok(())
    }

    #[test]
    fn reactivate_rejects_expired_pass() -> TestResult {
        let mut pass = pass()?;
        pass.cancel(false)?;

        let result = pass.reactivate(at_minutes(180));

        assert_eq!(
            result,
            Err(TransitionError::Expired {
                ends_at: at_minutes(180)
            })
        );
        assert_eq!(pass.status, PassStatus::Cancelled);

        Ok(())
    }

    #[test]
    fn reactivate_requires_cancelled() -> TestResult {
        let mut pass = pass()?;

        assert_eq!(
            pass.reactivate(at_minutes(10)),
            Err(TransitionError::NotCancelled {
                status: PassStatus::Active
            })
        );

        Ok(())
    }

    #[test]
    fn clear_warning_only_from_warning() -> TestResult {
        let mut pass = pass()?;

        assert!(pass.clear_warning().is_err());

        pass.status = PassStatus::Warning;

        assert_eq!(pass.clear_warning()?, PassStatus::Completed);

        Ok(())
    }

    #[test]
    fn expected_direction_alternates_after_each_crossing() -> TestResult {
        let mut pass = pass()?;

        pass.expect_after(Direction::In);
        assert_eq!(pass.expected_direction, Direction::Out);

        pass.expect_after(Direction::Out);
        assert_eq!(pass.expected_direction, Direction::In);

        pass.expect_after(Direction::Out);
        assert_eq!(pass.expected_direction, Direction::In);

        Ok(())
    }

    #[test]
    fn settle_classifies_by_last_direction() -> TestResult {
        let end = at_minutes(181);

        for (last, expected) in [
            (None, PassStatus::Outdated),
            (Some(Direction::Out), PassStatus::Completed),
            (Some(Direction::In), PassStatus::Warning),
        ] {
            let mut pass = pass()?;

            assert_eq!(pass.settle(end, last)?, expected);
        }

        Ok(())
    }

    #[test]
    fn settle_waits_for_window_to_close() -> TestResult {
        let mut pass = pass()?;

        assert!(!pass.is_due(at_minutes(100)));
        assert!(pass.settle(at_minutes(100), None).is_err());
        assert_eq!(pass.status, PassStatus::Active);

        Ok(())
    }

    #[test]
    fn settling_twice_is_rejected_and_keeps_first_outcome() -> TestResult {
        let mut pass = pass()?;
        let now = at_minutes(200);

        pass.settle(now, Some(Direction::In))?;

        assert!(!pass.is_due(now));
        assert!(pass.settle(now, None).is_err());
        assert_eq!(pass.status, PassStatus::Warning);

        Ok(())
    }
}
