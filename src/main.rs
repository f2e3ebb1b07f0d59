//! Timeline monitor — binary entrypoint.
//! Runs one cycle right away, then one per configured interval.
//! `--once` runs a single cycle and exits.

use std::sync::Arc;

use timeline_monitor::scheduler::{run_forever, SchedulerCfg};
use timeline_monitor::{build_driver, telemetry, MonitorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    telemetry::init();

    let cfg = MonitorConfig::load_default()?;
    let driver = Arc::new(build_driver(&cfg)?);

    if std::env::args().skip(1).any(|a| a == "--once") {
        let report = driver.run_cycle().await?;
        println!("{report:?}");
        return Ok(());
    }

    tokio::select! {
        _ = run_forever(driver, SchedulerCfg::from_minutes(cfg.schedule.interval_minutes)) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }
    Ok(())
}
