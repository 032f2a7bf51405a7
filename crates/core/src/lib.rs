//! Passage
//!
//! Rules for vehicle and pedestrian passes: who may hold which pass, how a
//! crossing moves a pass through its lifecycle, and how passes are settled
//! once their validity window closes. Everything here is pure; storage and
//! scheduling live in the application crate.

pub mod checkpoints;
pub mod crossings;
pub mod fixtures;
pub mod identities;
pub mod lifecycle;
pub mod overlap;
pub mod passes;
pub mod prelude;
pub mod processors;
pub mod uuids;
pub mod variants;
