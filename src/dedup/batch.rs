// src/dedup/batch.rs
//! Collapse near-duplicate candidates captured within one scrape.
//!
//! The same post is usually picked up by several scroll passes. First
//! observation wins; later ones scoring at or above the threshold against
//! anything already accepted are dropped. Pairwise O(n²): fine for the tens
//! of candidates a timeline scrape yields, not meant for large batches.

use crate::config::DedupConfig;
use crate::dedup::similarity::{Corpus, SimilarityMode};
use crate::ingest::types::Candidate;
use crate::ingest::{normalize_text, preview};

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub kept: Vec<Candidate>,
    pub too_short: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone)]
pub struct IntraBatchDeduplicator {
    threshold: f64,
    min_chars: usize,
}

impl IntraBatchDeduplicator {
    pub fn new(cfg: &DedupConfig) -> Self {
        Self {
            threshold: cfg.similarity_threshold,
            min_chars: cfg.min_batch_chars,
        }
    }

    /// Within one render the trailing metadata of a post is identical across
    /// passes, so full texts are compared here (no trailing trim).
    pub fn dedupe(&self, candidates: Vec<Candidate>) -> BatchReport {
        let total = candidates.len();
        let mut out = BatchReport::default();
        let mut accepted = Corpus::new(SimilarityMode::Untrimmed);

        for c in candidates {
            let norm = normalize_text(&c.content);
            if norm.chars().count() < self.min_chars {
                out.too_short += 1;
                continue;
            }
            if let Some(score) = accepted.find_similar(&norm, self.threshold) {
                out.duplicates += 1;
                tracing::debug!(
                    target: "dedup",
                    id = %c.identifier,
                    score,
                    text = %preview(&norm),
                    "intra-batch duplicate"
                );
                continue;
            }
            accepted.push(&norm);
            out.kept.push(c);
        }

        tracing::info!(
            target: "dedup",
            total,
            kept = out.kept.len(),
            too_short = out.too_short,
            duplicates = out.duplicates,
            "intra-batch dedup"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cand(id: &str, content: &str) -> Candidate {
        Candidate {
            identifier: id.into(),
            content: content.into(),
            observed_at: Utc::now(),
            source_tag: "initial".into(),
            published: None,
        }
    }

    fn dedup() -> IntraBatchDeduplicator {
        IntraBatchDeduplicator::new(&DedupConfig::default())
    }

    #[test]
    fn trailing_space_variant_collapses_to_one() {
        let out = dedup().dedupe(vec![
            cand("a", "Breaking news today about the economy and markets"),
            cand("b", "Breaking news today about the economy and markets "),
        ]);
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.kept[0].identifier, "a");
        assert_eq!(out.duplicates, 1);
    }

    #[test]
    fn short_scraps_are_dropped_before_comparison() {
        let out = dedup().dedupe(vec![
            cand("nav", "Home  Explore"),
            cand("a", "A real post about infrastructure spending"),
        ]);
        assert_eq!(out.too_short, 1);
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.kept[0].identifier, "a");
    }

    #[test]
    fn length_counts_normalized_chars() {
        // 21 raw chars but only 19 once whitespace collapses
        let out = dedup().dedupe(vec![cand("x", "abcdefghi   jklmnopqr")]);
        assert_eq!(out.too_short, 1);
        assert!(out.kept.is_empty());
    }

    #[test]
    fn distinct_posts_survive_in_order() {
        let out = dedup().dedupe(vec![
            cand("1", "Tariffs on imported steel will begin next month"),
            cand("2", "Great rally in Pennsylvania tonight, thank you all"),
            cand("3", "TARIFFS on imported steel will begin next month!"),
            cand("4", "The border is closed and secure, numbers are way down"),
        ]);
        let ids: Vec<_> = out.kept.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }
}
