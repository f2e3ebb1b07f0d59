// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cycle::CycleDriver;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub interval: Duration,
}

impl SchedulerCfg {
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            interval: Duration::from_secs(minutes.max(1) * 60),
        }
    }
}

/// Run cycles forever: the first immediately, then once per interval.
/// A cycle that overruns swallows the ticks it missed rather than bunching
/// them up; errors are logged and the loop keeps going.
pub async fn run_forever(driver: Arc<CycleDriver>, cfg: SchedulerCfg) {
    let mut ticker = tokio::time::interval(cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(
        target: "scheduler",
        interval_secs = cfg.interval.as_secs(),
        "monitor scheduler started"
    );
    loop {
        ticker.tick().await;
        if let Err(e) = driver.run_cycle().await {
            tracing::warn!(target: "scheduler", error = %e, "cycle failed; will retry next tick");
        }
    }
}

pub fn spawn_scheduler(driver: Arc<CycleDriver>, cfg: SchedulerCfg) -> JoinHandle<()> {
    tokio::spawn(run_forever(driver, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_minutes_is_clamped() {
        assert_eq!(SchedulerCfg::from_minutes(0).interval, Duration::from_secs(60));
        assert_eq!(SchedulerCfg::from_minutes(60).interval, Duration::from_secs(3600));
    }
}
