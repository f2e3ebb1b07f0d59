// src/cycle.rs
//! One monitoring cycle: load seen state, fetch, validate, dedupe, classify,
//! notify, save. Cycles never overlap; the store file has a single writer.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::MonitorConfig;
use crate::dedup::IntraBatchDeduplicator;
use crate::error::CycleError;
use crate::ingest::types::CandidateSource;
use crate::ingest::validate_batch;
use crate::notify::{NotificationBatch, Notifier};
use crate::novelty::NoveltyFilter;
use crate::store::SeenStore;

/// One-time metrics registration (so series show up once a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("monitor_cycles_total", "Completed monitoring cycles.");
        describe_counter!("monitor_cycle_errors_total", "Cycles that ended in an error.");
        describe_counter!("monitor_candidates_total", "Raw candidates received from the source.");
        describe_counter!("monitor_malformed_total", "Candidates dropped as malformed.");
        describe_counter!(
            "monitor_batch_duplicates_total",
            "Candidates collapsed by intra-batch dedup."
        );
        describe_counter!("monitor_new_posts_total", "Posts classified as new.");
        describe_counter!(
            "monitor_skipped_similar_total",
            "Posts skipped as similar to seen ones."
        );
        describe_counter!("monitor_notify_failures_total", "Failed notification deliveries.");
        describe_gauge!("monitor_seen_records", "Records in the seen store after the last cycle.");
    });
}

/// What happened during a cycle, for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub malformed: usize,
    pub batch_too_short: usize,
    pub batch_duplicates: usize,
    pub too_short: usize,
    pub already_seen: usize,
    pub skipped_similar: usize,
    pub new_posts: usize,
    /// `None` when there was nothing to send.
    pub delivered: Option<bool>,
    pub seen_records: usize,
}

pub struct CycleDriver {
    source: Arc<dyn CandidateSource>,
    notifier: Arc<dyn Notifier>,
    dedup: IntraBatchDeduplicator,
    filter: NoveltyFilter,
    store_path: PathBuf,
    profile_url: String,
}

impl CycleDriver {
    pub fn new(
        cfg: &MonitorConfig,
        source: Arc<dyn CandidateSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            notifier,
            dedup: IntraBatchDeduplicator::new(&cfg.dedup),
            filter: NoveltyFilter::new(&cfg.dedup),
            store_path: cfg.store.path.clone(),
            profile_url: cfg.source.profile_url.clone(),
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run a cycle with `now` as the decision timestamp.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        ensure_metrics_described();
        let result = self.cycle(now).await;
        match &result {
            Ok(r) => {
                counter!("monitor_cycles_total").increment(1);
                gauge!("monitor_seen_records").set(r.seen_records as f64);
            }
            Err(_) => counter!("monitor_cycle_errors_total").increment(1),
        }
        result
    }

    async fn cycle(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let mut store = SeenStore::load(&self.store_path);

        let raw = self
            .source
            .fetch_candidates()
            .await
            .map_err(CycleError::Source)?;
        let mut report = CycleReport {
            fetched: raw.len(),
            ..CycleReport::default()
        };
        counter!("monitor_candidates_total").increment(raw.len() as u64);

        let (candidates, malformed) = validate_batch(raw, now);
        report.malformed = malformed;
        counter!("monitor_malformed_total").increment(malformed as u64);

        let batch = self.dedup.dedupe(candidates);
        report.batch_too_short = batch.too_short;
        report.batch_duplicates = batch.duplicates;
        counter!("monitor_batch_duplicates_total").increment(batch.duplicates as u64);

        let outcome = self.filter.classify_batch(batch.kept, &mut store, now);
        report.too_short = outcome.too_short;
        report.already_seen = outcome.already_seen;
        report.skipped_similar = outcome.skipped_similar;
        report.new_posts = outcome.new_posts.len();
        counter!("monitor_new_posts_total").increment(report.new_posts as u64);
        counter!("monitor_skipped_similar_total").increment(report.skipped_similar as u64);

        // Delivery failures are logged only; recorded decisions stand either way.
        if !outcome.new_posts.is_empty() {
            let batch = NotificationBatch::new(outcome.new_posts, now, &self.profile_url);
            let delivered = match self.notifier.send(&batch).await {
                Ok(()) => true,
                Err(e) => {
                    counter!("monitor_notify_failures_total").increment(1);
                    tracing::error!(notifier = self.notifier.name(), error = %format!("{e:#}"), "notification failed");
                    false
                }
            };
            report.delivered = Some(delivered);
        }

        store.save()?;
        report.seen_records = store.len();

        tracing::info!(
            source = self.source.name(),
            fetched = report.fetched,
            malformed = report.malformed,
            batch_duplicates = report.batch_duplicates,
            already_seen = report.already_seen,
            skipped_similar = report.skipped_similar,
            new_posts = report.new_posts,
            delivered = ?report.delivered,
            "cycle finished"
        );
        Ok(report)
    }
}
