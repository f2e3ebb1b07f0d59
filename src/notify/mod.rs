// src/notify/mod.rs
pub mod email;
pub mod log;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::MonitorConfig;
use crate::ingest::types::Candidate;

/// Everything a notifier needs to render one alert for a cycle.
#[derive(Debug, Clone)]
pub struct NotificationBatch {
    pub posts: Vec<Candidate>,
    pub count: usize,
    pub generated_at: DateTime<Utc>,
    pub profile_url: String,
}

impl NotificationBatch {
    pub fn new(posts: Vec<Candidate>, generated_at: DateTime<Utc>, profile_url: &str) -> Self {
        Self {
            count: posts.len(),
            posts,
            generated_at,
            profile_url: profile_url.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, batch: &NotificationBatch) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Email when SMTP is configured, otherwise log-only.
pub fn notifier_from_env(cfg: &MonitorConfig) -> Arc<dyn Notifier> {
    match email::EmailNotifier::from_env(&cfg.notify) {
        Ok(Some(n)) => Arc::new(n),
        Ok(None) => {
            tracing::info!("email disabled (SMTP_HOST not set); notifications go to the log");
            Arc::new(log::LogNotifier)
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "email misconfigured; notifications go to the log");
            Arc::new(log::LogNotifier)
        }
    }
}
