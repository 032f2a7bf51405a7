//! Checkpoints

mod repository;

pub use repository::*;
