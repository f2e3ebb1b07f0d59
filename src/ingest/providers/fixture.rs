use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::ingest::decode_candidates;
use crate::ingest::types::{CandidateSource, RawRecord};

/// Reads a JSON array of scraped candidates from disk. The file is re-read
/// every cycle, so an external scraper can keep overwriting it.
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn parse_str(s: &str) -> Result<Vec<RawRecord>> {
        decode_candidates(s).context("parsing candidate fixture JSON")
    }
}

#[async_trait]
impl CandidateSource for FixtureSource {
    async fn fetch_candidates(&self) -> Result<Vec<RawRecord>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading candidates from {}", self.path.display()))?;
        let items = Self::parse_str(&body)?;
        tracing::debug!(target: "ingest", path = %self.path.display(), count = items.len(), "fixture loaded");
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
