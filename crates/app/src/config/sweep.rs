//! Sweep Config

use std::time::Duration;

use clap::Args;

/// Scheduled sweep settings.
#[derive(Debug, Args)]
pub struct SweepConfig {
    /// Seconds between sweeps of elapsed passes
    #[arg(
        long,
        env = "SWEEP_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sweep_interval_secs: u64,
}

impl SweepConfig {
    /// Time between sweeps.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
