//! Identities owned by external collaborators.
//!
//! Users and territories are managed elsewhere; this crate only carries their
//! identifiers around.

use crate::uuids::TypedUuid;

/// Marker for user identifiers.
#[derive(Debug)]
pub enum User {}

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Marker for territory identifiers.
#[derive(Debug)]
pub enum Territory {}

/// Territory UUID
pub type TerritoryUuid = TypedUuid<Territory>;
