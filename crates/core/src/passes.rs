//! Passes

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    crossings::Direction,
    identities::{TerritoryUuid, UserUuid},
    uuids::TypedUuid,
    variants::UnknownVariant,
};

/// Pass UUID
pub type PassUuid = TypedUuid<Pass>;

/// Where a pass sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    /// Usable for crossings.
    Active,

    /// Withdrawn before it was ever used.
    Cancelled,

    /// Used and closed cleanly.
    Completed,

    /// Validity window elapsed without a single crossing.
    Outdated,

    /// Validity window elapsed while the holder was still inside.
    Warning,
}

impl PassStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Outdated => "outdated",
            Self::Warning => "warning",
        }
    }
}

impl Display for PassStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            "outdated" => Ok(Self::Outdated),
            "warning" => Ok(Self::Warning),
            _ => Err(UnknownVariant::new("pass status", s)),
        }
    }
}

/// Governs how crossings consume a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeType {
    /// One entry and one exit, then the pass is spent.
    OneTime,

    /// Any number of crossings within the validity window.
    Permanent,
}

impl TimeType {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Permanent => "permanent",
        }
    }
}

impl Display for TimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "one_time" | "onetime" => Ok(Self::OneTime),
            "permanent" => Ok(Self::Permanent),
            _ => Err(UnknownVariant::new("pass time type", s)),
        }
    }
}

/// Discriminator of [`PassKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKindTag {
    /// Vehicle-bound pass.
    Vehicle,

    /// Pedestrian-bound pass.
    Pedestrian,
}

impl PassKindTag {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Pedestrian => "pedestrian",
        }
    }
}

impl Display for PassKindTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassKindTag {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vehicle" => Ok(Self::Vehicle),
            "pedestrian" => Ok(Self::Pedestrian),
            _ => Err(UnknownVariant::new("pass kind", s)),
        }
    }
}

/// What a pass is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassKind {
    /// A vehicle, identified by its licence plate.
    Vehicle {
        /// Licence plate, when known.
        plate: Option<String>,
    },

    /// A visitor on foot, identified by name.
    Pedestrian {
        /// Visitor name, when known.
        visitor: Option<String>,
    },
}

impl PassKind {
    /// Vehicle pass for the given plate.
    pub fn vehicle(plate: impl Into<String>) -> Self {
        Self::Vehicle {
            plate: Some(plate.into()),
        }
    }

    /// Pedestrian pass for the given visitor.
    pub fn pedestrian(visitor: impl Into<String>) -> Self {
        Self::Pedestrian {
            visitor: Some(visitor.into()),
        }
    }

    /// The discriminator.
    pub const fn tag(&self) -> PassKindTag {
        match self {
            Self::Vehicle { .. } => PassKindTag::Vehicle,
            Self::Pedestrian { .. } => PassKindTag::Pedestrian,
        }
    }

    /// Rebuild a kind from its stored discriminator and identifier.
    pub fn from_parts(tag: PassKindTag, identifier: Option<String>) -> Self {
        match tag {
            PassKindTag::Vehicle => Self::Vehicle { plate: identifier },
            PassKindTag::Pedestrian => Self::Pedestrian {
                visitor: identifier,
            },
        }
    }

    /// Plate or visitor name.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Vehicle { plate } => plate.as_deref(),
            Self::Pedestrian { visitor } => visitor.as_deref(),
        }
    }
}

/// Rejected validity window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validity window must end after it starts (start {start}, end {end})")]
pub struct InvalidWindow {
    /// Requested start.
    pub start: Timestamp,

    /// Requested end.
    pub end: Timestamp,
}

/// Half-open interval `[start, end)` during which a pass may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidityWindow {
    start: Timestamp,
    end: Timestamp,
}

impl ValidityWindow {
    /// Build a window, rejecting one that does not end strictly after it starts.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWindow`] when `end <= start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, InvalidWindow> {
        if end <= start {
            return Err(InvalidWindow { start, end });
        }

        Ok(Self { start, end })
    }

    /// Window start.
    pub const fn start(&self) -> Timestamp {
        self.start
    }

    /// Window end.
    pub const fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether the two windows share any instant. Touching endpoints do not.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.end > other.start && self.start < other.end
    }

    /// Whether the window has closed at `now`.
    pub fn has_elapsed(&self, now: Timestamp) -> bool {
        self.end <= now
    }
}

/// Authorisation for one vehicle or visitor to cross checkpoints of a territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pass {
    /// Unique pass identifier.
    pub uuid: PassUuid,

    /// User who issued the pass.
    pub user_uuid: UserUuid,

    /// Territory the pass grants access to.
    pub territory_uuid: TerritoryUuid,

    /// Vehicle or pedestrian payload.
    #[serde(flatten)]
    pub kind: PassKind,

    /// Crossing rules.
    pub time_type: TimeType,

    /// When the pass may be used.
    pub window: ValidityWindow,

    /// Lifecycle status.
    pub status: PassStatus,

    /// Direction the next crossing should take.
    pub expected_direction: Direction,

    /// Free-text comment.
    pub note: Option<String>,

    /// Optimistic concurrency counter, bumped on every write.
    pub version: u64,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,
}

/// Everything needed to issue a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassDraft {
    /// UUID to assign.
    pub uuid: PassUuid,

    /// Issuing user.
    pub user_uuid: UserUuid,

    /// Target territory.
    pub territory_uuid: TerritoryUuid,

    /// Vehicle or pedestrian payload.
    pub kind: PassKind,

    /// Crossing rules.
    pub time_type: TimeType,

    /// Validity window.
    pub window: ValidityWindow,

    /// Free-text comment.
    pub note: Option<String>,
}

impl Pass {
    /// A freshly issued pass: active, expecting an entry.
    pub fn issue(draft: PassDraft, now: Timestamp) -> Self {
        Self {
            uuid: draft.uuid,
            user_uuid: draft.user_uuid,
            territory_uuid: draft.territory_uuid,
            kind: draft.kind,
            time_type: draft.time_type,
            window: draft.window,
            status: PassStatus::Active,
            expected_direction: Direction::In,
            note: draft.note,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the pass as written at `now`, bumping its version.
    pub fn touch(&mut self, now: Timestamp) {
        self.version += 1;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::fixtures::t0;

    use super::*;

    #[test]
    fn window_rejects_empty_and_inverted_ranges() {
        let start = t0();

        assert!(ValidityWindow::new(start, start).is_err());
        assert!(ValidityWindow::new(start, start - 1.hour()).is_err());
        assert!(ValidityWindow::new(start, start + 1.second()).is_ok());
    }

    #[test]
    fn touching_windows_do_not_overlap() -> TestResult {
        let start = t0();
        let a = ValidityWindow::new(start, start + 1.hour())?;
        let b = ValidityWindow::new(start + 1.hour(), start + 2.hours())?;

        assert!(!a.overlaps(&b), "windows sharing only an endpoint overlap");
        assert!(!b.overlaps(&a), "windows sharing only an endpoint overlap");

        Ok(())
    }

    #[test]
    fn overlap_is_symmetric() -> TestResult {
        let start = t0();
        let offsets: [(i64, i64); 6] = [
            (0, 60),
            (30, 90),
            (60, 120),
            (-30, 10),
            (10, 20),
            (120, 180),
        ];

        for (a_start, a_end) in offsets {
            for (b_start, b_end) in offsets {
                let a = ValidityWindow::new(start + a_start.minutes(), start + a_end.minutes())?;
                let b = ValidityWindow::new(start + b_start.minutes(), start + b_end.minutes())?;

                assert_eq!(
                    a.overlaps(&b),
                    b.overlaps(&a),
                    "asymmetric overlap for {a:?} and {b:?}"
                );
            }
        }

        Ok(())
    }

    #[test]
    fn window_elapses_at_its_end() -> TestResult {
        let start = t0();
        let window = ValidityWindow::new(start, start + 3.hours())?;

        assert!(!window.has_elapsed(start + 2.hours()));
        assert!(window.has_elapsed(start + 3.hours()));
        assert!(window.has_elapsed(start + 4.hours()));

        Ok(())
    }

    #[test]
    fn issued_pass_is_active_and_expects_entry() -> TestResult {
        let now = t0();
        let pass = Pass::issue(
            PassDraft {
                uuid: PassUuid::new(),
                user_uuid: UserUuid::new(),
                territory_uuid: TerritoryUuid::new(),
                kind: PassKind::vehicle("А420ВХ799"),
                time_type: TimeType::OneTime,
                window: ValidityWindow::new(now, now + 3.hours())?,
                note: None,
            },
            now,
        );

        assert_eq!(pass.status, PassStatus::Active);
        assert_eq!(pass.expected_direction, Direction::In);
        assert_eq!(pass.version, 0);
        assert_eq!(pass.kind.identifier(), Some("А420ВХ799"));

        Ok(())
    }

    #[test]
    fn statuses_round_trip_through_storage_strings() {
        for status in [
            PassStatus::Active,
            PassStatus::Cancelled,
            PassStatus::Completed,
            PassStatus::Outdated,
            PassStatus::Warning,
        ] {
            assert_eq!(status.as_str().parse::<PassStatus>(), Ok(status));
        }

        assert!("delayed".parse::<PassStatus>().is_err());
    }

    #[test]
    fn time_type_accepts_common_spellings() {
        assert_eq!("ONE_TIME".parse::<TimeType>(), Ok(TimeType::OneTime));
        assert_eq!("one-time".parse::<TimeType>(), Ok(TimeType::OneTime));
        assert_eq!("permanent".parse::<TimeType>(), Ok(TimeType::Permanent));
        assert!("weekly".parse::<TimeType>().is_err());
    }

    #[test]
    fn kind_rebuilds_from_stored_parts() {
        let kind = PassKind::pedestrian("Guest");

        assert_eq!(
            PassKind::from_parts(kind.tag(), kind.identifier().map(str::to_string)),
            kind
        );
        assert_eq!(
            PassKind::from_parts(PassKindTag::Vehicle, None),
            PassKind::Vehicle { plate: None }
        );
    }
}
