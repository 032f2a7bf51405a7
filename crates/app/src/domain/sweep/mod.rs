//! Sweep

mod scheduler;
mod service;

pub use scheduler::*;
pub use service::*;
