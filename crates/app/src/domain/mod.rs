//! Passage Domain Concerns

pub mod checkpoints;
pub mod crossings;
pub mod errors;
pub mod passes;
pub mod sweep;
