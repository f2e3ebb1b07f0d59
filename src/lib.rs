// src/lib.rs
//! Timeline monitor: finds genuinely new posts on a scraped profile timeline
//! and sends one batched alert per cycle.
//!
//! Flow per cycle: raw candidates -> validation -> intra-batch dedup ->
//! novelty filter (against the persisted seen store) -> notifier -> save.

pub mod config;
pub mod cycle;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod novelty;
pub mod scheduler;
pub mod store;
pub mod telemetry;

pub use crate::config::MonitorConfig;
pub use crate::cycle::{CycleDriver, CycleReport};
pub use crate::error::{CandidateError, CycleError, StoreError};
pub use crate::ingest::types::{Candidate, CandidateSource, RawCandidate, RawRecord};
pub use crate::notify::{NotificationBatch, Notifier};
pub use crate::novelty::{NoveltyFilter, Verdict};
pub use crate::store::{SeenRecord, SeenStatus, SeenStore};

/// Wire a driver from config: configured source plus env-selected notifier.
pub fn build_driver(cfg: &MonitorConfig) -> anyhow::Result<CycleDriver> {
    let source = ingest::providers::build_source(&cfg.source)?;
    let notifier = notify::notifier_from_env(cfg);
    tracing::info!(
        source = source.name(),
        notifier = notifier.name(),
        store = %cfg.store.path.display(),
        threshold = cfg.dedup.similarity_threshold,
        "monitor wired"
    );
    Ok(CycleDriver::new(cfg, source, notifier))
}
