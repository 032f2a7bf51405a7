//! Crossings

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    checkpoints::CheckpointUuid, passes::PassUuid, uuids::TypedUuid, variants::UnknownVariant,
};

/// Crossing UUID
pub type CrossingUuid = TypedUuid<Crossing>;

/// Which way a pass holder moved through a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Entering the territory.
    In,

    /// Leaving the territory.
    Out,
}

impl Direction {
    /// The direction a holder is expected to take after crossing this way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(UnknownVariant::new("crossing direction", s)),
        }
    }
}

/// A pass used at a checkpoint. Crossings are facts: once recorded they are
/// never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crossing {
    /// Unique crossing identifier.
    pub uuid: CrossingUuid,

    /// Pass that authorised the crossing.
    pub pass_uuid: PassUuid,

    /// Checkpoint the crossing happened at.
    pub checkpoint_uuid: CheckpointUuid,

    /// Direction of travel.
    pub direction: Direction,

    /// When the crossing happened.
    pub performed_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_alternates() {
        assert_eq!(Direction::In.opposite(), Direction::Out);
        assert_eq!(Direction::Out.opposite(), Direction::In);
        assert_eq!(Direction::In.opposite().opposite(), Direction::In);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("IN".parse::<Direction>(), Ok(Direction::In));
        assert_eq!("out".parse::<Direction>(), Ok(Direction::Out));
        assert!("sideways".parse::<Direction>().is_err());
    }
}
