//! Sends a sample batch through the configured notifier (email when SMTP_* is
//! set, otherwise the log).

use chrono::Utc;
use timeline_monitor::notify::{notifier_from_env, NotificationBatch};
use timeline_monitor::{telemetry, Candidate, MonitorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init();
    let cfg = MonitorConfig::load_default()?;
    let notifier = notifier_from_env(&cfg);

    let now = Utc::now();
    let posts = vec![Candidate {
        identifier: "demo-1".into(),
        content: "This is a demo post used to check that notifications are delivered and \
                  rendered correctly end to end."
            .into(),
        observed_at: now,
        source_tag: "demo".into(),
        published: Some(now.format("%b %d, %Y").to_string()),
    }];
    let batch = NotificationBatch::new(posts, now, &cfg.source.profile_url);
    notifier.send(&batch).await?;

    println!("notify-demo done via {}", notifier.name());
    Ok(())
}
