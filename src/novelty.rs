// src/novelty.rs
//! Cross-cycle novelty classification.
//!
//! Per candidate, in order (cheapest check first):
//!   too short            -> TooShort        (no record)
//!   identifier on record -> AlreadySeen     (record untouched)
//!   similar to history   -> SkippedSimilar  (record, status skipped_similar)
//!   otherwise            -> New             (record, status notified)
//!
//! The comparison corpus is the store's content snapshotted once at the start
//! of `classify_batch`. Posts recorded during the same call are not added to
//! it; intra-batch dedup already collapsed same-cycle duplicates.

use chrono::{DateTime, Utc};

use crate::config::DedupConfig;
use crate::dedup::similarity::{Corpus, SimilarityMode};
use crate::ingest::types::Candidate;
use crate::ingest::{normalize_text, preview};
use crate::store::{SeenRecord, SeenStatus, SeenStore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    TooShort,
    AlreadySeen,
    SkippedSimilar { score: f64 },
    New,
}

#[derive(Debug, Clone, Default)]
pub struct NoveltyOutcome {
    /// Candidates classified `New`, in input order.
    pub new_posts: Vec<Candidate>,
    pub too_short: usize,
    pub already_seen: usize,
    pub skipped_similar: usize,
}

#[derive(Debug, Clone)]
pub struct NoveltyFilter {
    threshold: f64,
    min_chars: usize,
    mode: SimilarityMode,
}

impl NoveltyFilter {
    pub fn new(cfg: &DedupConfig) -> Self {
        Self {
            threshold: cfg.similarity_threshold,
            min_chars: cfg.min_novel_chars,
            mode: SimilarityMode::TrimTrailing(cfg.trailing_trim_tokens),
        }
    }

    /// Snapshot of the store's contents, prepared for comparison.
    pub fn snapshot(&self, store: &SeenStore) -> Corpus {
        let contents = store.all_contents();
        Corpus::build(contents.iter().map(|c| normalize_text(c)), self.mode)
    }

    /// Verdict for a single candidate. Pure; the store is not modified.
    pub fn classify(&self, c: &Candidate, store: &SeenStore, corpus: &Corpus) -> Verdict {
        let norm = normalize_text(&c.content);
        if norm.chars().count() < self.min_chars {
            return Verdict::TooShort;
        }
        if store.contains(&c.identifier) {
            return Verdict::AlreadySeen;
        }
        match corpus.find_similar(&norm, self.threshold) {
            Some(score) => Verdict::SkippedSimilar { score },
            None => Verdict::New,
        }
    }

    /// Classify a deduplicated batch and record decisions in `store` (in memory
    /// only; the caller saves once after the cycle).
    pub fn classify_batch(
        &self,
        candidates: Vec<Candidate>,
        store: &mut SeenStore,
        now: DateTime<Utc>,
    ) -> NoveltyOutcome {
        let corpus = self.snapshot(store);
        tracing::info!(
            target: "novelty",
            candidates = candidates.len(),
            history = corpus.len(),
            "comparing against seen posts"
        );

        let mut out = NoveltyOutcome::default();
        for c in candidates {
            match self.classify(&c, store, &corpus) {
                Verdict::TooShort => {
                    out.too_short += 1;
                    tracing::debug!(target: "novelty", id = %c.identifier, text = %preview(&c.content), "too short");
                }
                Verdict::AlreadySeen => {
                    out.already_seen += 1;
                    tracing::debug!(target: "novelty", id = %c.identifier, "already seen");
                }
                Verdict::SkippedSimilar { score } => {
                    out.skipped_similar += 1;
                    tracing::info!(target: "novelty", id = %c.identifier, score, text = %preview(&c.content), "similar to a seen post");
                    store.record(&c.identifier, seen_record(&c, SeenStatus::SkippedSimilar, now));
                }
                Verdict::New => {
                    tracing::info!(target: "novelty", id = %c.identifier, text = %preview(&c.content), "new post");
                    store.record(&c.identifier, seen_record(&c, SeenStatus::Notified, now));
                    out.new_posts.push(c);
                }
            }
        }
        out
    }
}

fn seen_record(c: &Candidate, status: SeenStatus, now: DateTime<Utc>) -> SeenRecord {
    SeenRecord {
        content: c.content.clone(),
        date: c.published_or_unknown(),
        status,
        decided_at: now,
    }
}
