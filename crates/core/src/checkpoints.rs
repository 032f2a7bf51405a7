//! Checkpoints

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    identities::TerritoryUuid, passes::PassKindTag, uuids::TypedUuid, variants::UnknownVariant,
};

/// Checkpoint UUID
pub type CheckpointUuid = TypedUuid<Checkpoint>;

/// Which pass kinds a checkpoint lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointType {
    /// Vehicles and pedestrians.
    Universal,

    /// Vehicle gate.
    Vehicle,

    /// Turnstile or pedestrian door.
    Pedestrian,
}

impl CheckpointType {
    /// Whether a pass of the given kind may cross here.
    pub const fn accepts(self, kind: PassKindTag) -> bool {
        matches!(
            (self, kind),
            (Self::Universal, _)
                | (Self::Vehicle, PassKindTag::Vehicle)
                | (Self::Pedestrian, PassKindTag::Pedestrian)
        )
    }

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Universal => "universal",
            Self::Vehicle => "vehicle",
            Self::Pedestrian => "pedestrian",
        }
    }
}

impl Display for CheckpointType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckpointType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "universal" => Ok(Self::Universal),
            "vehicle" => Ok(Self::Vehicle),
            "pedestrian" => Ok(Self::Pedestrian),
            _ => Err(UnknownVariant::new("checkpoint type", s)),
        }
    }
}

/// A physical access point on a territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkpoint {
    /// Unique checkpoint identifier.
    pub uuid: CheckpointUuid,

    /// Territory the checkpoint belongs to.
    pub territory_uuid: TerritoryUuid,

    /// Display name.
    pub name: String,

    /// Accepted pass kinds.
    pub checkpoint_type: CheckpointType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_checkpoint_accepts_everything() {
        assert!(CheckpointType::Universal.accepts(PassKindTag::Vehicle));
        assert!(CheckpointType::Universal.accepts(PassKindTag::Pedestrian));
    }

    #[test]
    fn restricted_checkpoints_accept_only_their_kind() {
        assert!(CheckpointType::Vehicle.accepts(PassKindTag::Vehicle));
        assert!(!CheckpointType::Vehicle.accepts(PassKindTag::Pedestrian));
        assert!(CheckpointType::Pedestrian.accepts(PassKindTag::Pedestrian));
        assert!(!CheckpointType::Pedestrian.accepts(PassKindTag::Vehicle));
    }
}
