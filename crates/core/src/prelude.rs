//! Passage prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    checkpoints::{Checkpoint, CheckpointType, CheckpointUuid},
    crossings::{Crossing, CrossingUuid, Direction},
    identities::{TerritoryUuid, UserUuid},
    lifecycle::{TransitionError, settled_status},
    overlap::{find_conflict, has_conflict},
    passes::{
        InvalidWindow, Pass, PassDraft, PassKind, PassKindTag, PassStatus, PassUuid, TimeType,
        ValidityWindow,
    },
    processors::{
        OneTimeProcessor, PassTypeProcessor, PermanentProcessor, Processed, ProcessorError,
        ProcessorRegistry,
    },
    uuids::TypedUuid,
    variants::UnknownVariant,
};
