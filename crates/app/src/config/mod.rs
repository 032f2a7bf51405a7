//! Configuration
//!
//! Settings are read from CLI flags with environment fallbacks; `.env` is
//! loaded by the binary before parsing.

mod db;
mod observability;
mod sweep;

pub use db::DatabaseConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use sweep::SweepConfig;
