//! Crossing Data

use jiff::Timestamp;
use passage::{
    checkpoints::CheckpointUuid,
    crossings::{CrossingUuid, Direction},
    passes::PassUuid,
};

/// A crossing reported by a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCrossing {
    /// UUID to assign to the crossing.
    pub uuid: CrossingUuid,

    /// Pass presented at the checkpoint.
    pub pass_uuid: PassUuid,

    /// Checkpoint the crossing happened at.
    pub checkpoint_uuid: CheckpointUuid,

    /// Entry or exit.
    pub direction: Direction,

    /// Server time the crossing was received.
    pub performed_at: Timestamp,
}
