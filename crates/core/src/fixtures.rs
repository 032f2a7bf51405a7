//! Fixtures
//!
//! Builders for passes and checkpoints with sensible defaults, shared by the
//! unit tests here and by the service tests of downstream crates.

use jiff::{SignedDuration, Timestamp};

use crate::{
    checkpoints::{Checkpoint, CheckpointType, CheckpointUuid},
    identities::{TerritoryUuid, UserUuid},
    passes::{InvalidWindow, Pass, PassDraft, PassKind, PassUuid, TimeType, ValidityWindow},
};

/// 2026-02-02T02:40:00Z, a fixed reference instant.
pub const T0_SECONDS: i64 = 1_770_000_000;

/// The reference instant as a [`Timestamp`].
pub fn t0() -> Timestamp {
    Timestamp::from_second(T0_SECONDS).unwrap_or(Timestamp::UNIX_EPOCH)
}

/// `t0` shifted by `minutes`.
pub fn at_minutes(minutes: i64) -> Timestamp {
    t0().checked_add(SignedDuration::from_mins(minutes))
        .unwrap_or_else(|_| t0())
}

/// Builder for [`Pass`] values.
#[derive(Debug, Clone)]
pub struct PassFixture {
    draft: PassDraft,
    issued_at: Timestamp,
}

impl PassFixture {
    /// A one-time vehicle pass valid for three hours from `t0`.
    ///
    /// # Errors
    ///
    /// Never fails for the default window; the signature keeps `?` usable.
    pub fn vehicle(
        user: UserUuid,
        territory: TerritoryUuid,
        plate: &str,
    ) -> Result<Self, InvalidWindow> {
        Self::with_kind(user, territory, PassKind::vehicle(plate))
    }

    /// A one-time pedestrian pass valid for three hours from `t0`.
    ///
    /// # Errors
    ///
    /// Never fails for the default window; the signature keeps `?` usable.
    pub fn pedestrian(
        user: UserUuid,
        territory: TerritoryUuid,
        visitor: &str,
    ) -> Result<Self, InvalidWindow> {
        Self::with_kind(user, territory, PassKind::pedestrian(visitor))
    }

    fn with_kind(
        user: UserUuid,
        territory: TerritoryUuid,
        kind: PassKind,
    ) -> Result<Self, InvalidWindow> {
        Ok(Self {
            draft: PassDraft {
                uuid: PassUuid::new(),
                user_uuid: user,
                territory_uuid: territory,
                kind,
                time_type: TimeType::OneTime,
                window: ValidityWindow::new(t0(), at_minutes(180))?,
                note: None,
            },
            issued_at: t0(),
        })
    }

    /// Use a permanent pass instead.
    #[must_use]
    pub fn permanent(mut self) -> Self {
        self.draft.time_type = TimeType::Permanent;
        self
    }

    /// Replace the validity window with `[t0 + start, t0 + end)` in minutes.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWindow`] when `end <= start`.
    pub fn window_minutes(mut self, start: i64, end: i64) -> Result<Self, InvalidWindow> {
        self.draft.window = ValidityWindow::new(at_minutes(start), at_minutes(end))?;
        Ok(self)
    }

    /// The draft the pass is issued from.
    pub fn draft(&self) -> PassDraft {
        self.draft.clone()
    }

    /// Issue the pass as it would be right after creation.
    pub fn build(self) -> Pass {
        Pass::issue(self.draft, self.issued_at)
    }
}

/// A checkpoint on `territory` of the given type.
pub fn checkpoint(territory: TerritoryUuid, checkpoint_type: CheckpointType) -> Checkpoint {
    Checkpoint {
        uuid: CheckpointUuid::new(),
        territory_uuid: territory,
        name: format!("{checkpoint_type} gate"),
        checkpoint_type,
    }
}
