//! Periodic sweep scheduling.

use std::{future::Future, sync::Arc, time::Duration};

use jiff::{SignedDuration, Timestamp};
use tokio::{
    sync::Mutex,
    time::{MissedTickBehavior, interval},
};
use tracing::{error, info, warn};

use crate::domain::sweep::{SweepReport, SweepService};

/// Default time between sweeps.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(60);

const HEARTBEAT_PERIOD: SignedDuration = SignedDuration::from_hours(1);

/// Runs the sweep on a fixed period, never two at a time.
pub struct SweepScheduler {
    sweeper: Arc<dyn SweepService>,
    period: Duration,
    running: Mutex<()>,
}

impl SweepScheduler {
    #[must_use]
    pub fn new(sweeper: Arc<dyn SweepService>, period: Duration) -> Self {
        Self {
            sweeper,
            period,
            running: Mutex::new(()),
        }
    }

    /// Sweep once now. Returns `None` when a sweep is already running or the
    /// sweep itself failed.
    pub async fn run_once(&self) -> Option<SweepReport> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("previous sweep still running, skipping tick");
            return None;
        };

        match self.sweeper.sweep(Timestamp::now()).await {
            Ok(report) => Some(report),
            Err(error) => {
                error!(%error, "sweep failed");
                None
            }
        }
    }

    /// Sweep every period until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut heartbeat = Heartbeat::default();

        tokio::pin!(shutdown);

        info!(period_secs = self.period.as_secs(), "sweep scheduler started");

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    let report = self.run_once().await;
                    heartbeat.observe(Timestamp::now(), report.as_ref());
                }
            }
        }

        info!("sweep scheduler stopped");
    }
}

/// Summarises quiet ticks so an idle scheduler still shows signs of life.
#[derive(Debug, Default)]
struct Heartbeat {
    last_logged: Option<Timestamp>,
    ticks: u64,
    settled: usize,
}

impl Heartbeat {
    fn observe(&mut self, now: Timestamp, report: Option<&SweepReport>) {
        self.ticks += 1;
        self.settled += report.map_or(0, SweepReport::settled);

        let due = self
            .last_logged
            .is_none_or(|last| now.duration_since(last) >= HEARTBEAT_PERIOD);

        if due {
            info!(
                ticks = self.ticks,
                settled = self.settled,
                "sweep scheduler alive"
            );

            self.last_logged = Some(now);
            self.ticks = 0;
            self.settled = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::{sync::oneshot, time::sleep};

    use crate::domain::{
        errors::RepositoryError,
        sweep::{MockSweepService, SweepError},
    };

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sweeps_every_period_until_shutdown() {
        let mut sweeper = MockSweepService::new();
        sweeper
            .expect_sweep()
            .times(3)
            .returning(|_| Ok(SweepReport::default()));

        let scheduler = SweepScheduler::new(Arc::new(sweeper), Duration::from_secs(60));
        let (stop, stopped) = oneshot::channel::<()>();

        let driver = async move {
            sleep(Duration::from_secs(150)).await;
            stop.send(()).ok();
        };

        tokio::join!(
            scheduler.run(async move {
                stopped.await.ok();
            }),
            driver,
        );
    }

    #[tokio::test]
    async fn tick_is_skipped_while_a_sweep_is_running() {
        let mut sweeper = MockSweepService::new();
        sweeper.expect_sweep().never();

        let scheduler = SweepScheduler::new(Arc::new(sweeper), DEFAULT_SWEEP_PERIOD);
        let _busy = scheduler.running.try_lock();

        assert_eq!(scheduler.run_once().await, None);
    }

    #[tokio::test]
    async fn failed_sweep_yields_no_report() {
        let mut sweeper = MockSweepService::new();
        sweeper
            .expect_sweep()
            .once()
            .returning(|_| Err(SweepError::Listing(RepositoryError::InvalidData)));

        let scheduler = SweepScheduler::new(Arc::new(sweeper), DEFAULT_SWEEP_PERIOD);

        assert_eq!(scheduler.run_once().await, None);
    }

    #[test]
    fn heartbeat_logs_at_most_once_per_period() {
        let start = Timestamp::UNIX_EPOCH;
        let mut heartbeat = Heartbeat::default();

        heartbeat.observe(start, None);
        assert_eq!(heartbeat.ticks, 0, "first tick is logged");

        let report = SweepReport {
            outdated: 2,
            ..SweepReport::default()
        };

        heartbeat.observe(start, Some(&report));
        assert_eq!(heartbeat.ticks, 1);
        assert_eq!(heartbeat.settled, 2);

        let later = start.checked_add(HEARTBEAT_PERIOD).unwrap_or(start);

        heartbeat.observe(later, None);
        assert_eq!(heartbeat.ticks, 0, "counters reset after logging");
        assert_eq!(heartbeat.settled, 0);
    }
}
