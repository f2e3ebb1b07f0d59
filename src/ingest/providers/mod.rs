// src/ingest/providers/mod.rs
pub mod fixture;
pub mod http_feed;

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::config::{SourceConfig, SourceKind};
use crate::ingest::types::CandidateSource;

/// Build the configured candidate source.
pub fn build_source(cfg: &SourceConfig) -> Result<Arc<dyn CandidateSource>> {
    match cfg.kind {
        SourceKind::Fixture => Ok(Arc::new(fixture::FixtureSource::new(&cfg.fixture_path))),
        SourceKind::Http => {
            let url = cfg
                .feed_url
                .as_deref()
                .ok_or_else(|| anyhow!("source.kind = \"http\" requires source.feed_url"))?;
            Ok(Arc::new(http_feed::HttpFeedSource::new(url, cfg.timeout_secs)?))
        }
    }
}
