//! Pass Data

use jiff::Timestamp;
use passage::{
    identities::{TerritoryUuid, UserUuid},
    passes::{PassKind, PassUuid, TimeType},
};

/// New Pass Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewPass {
    /// UUID to assign to the pass.
    pub uuid: PassUuid,

    /// Issuing user.
    pub user_uuid: UserUuid,

    /// Territory the pass is for.
    pub territory_uuid: TerritoryUuid,

    /// Vehicle plate or visitor name.
    pub kind: PassKind,

    /// One-time or permanent.
    pub time_type: TimeType,

    /// Start of the validity window.
    pub starts_at: Timestamp,

    /// End of the validity window.
    pub ends_at: Timestamp,

    /// Free-text comment.
    pub note: Option<String>,
}

/// Pass Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct PassUpdate {
    /// New start of the validity window.
    pub starts_at: Timestamp,

    /// New end of the validity window.
    pub ends_at: Timestamp,

    /// New comment.
    pub note: Option<String>,
}
