use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::ingest::decode_candidates;
use crate::ingest::types::{CandidateSource, RawRecord};

/// Pulls the latest scrape from a sidecar that renders the profile page and
/// serves the extracted posts as a JSON array.
pub struct HttpFeedSource {
    url: String,
    client: Client,
}

impl HttpFeedSource {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// An empty or `null` body means the sidecar had nothing this round.
    pub fn parse_body(body: &str) -> Result<Vec<RawRecord>> {
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Vec::new());
        }
        decode_candidates(trimmed).context("parse scrape feed JSON")
    }
}

#[async_trait]
impl CandidateSource for HttpFeedSource {
    async fn fetch_candidates(&self) -> Result<Vec<RawRecord>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("fetch scrape feed")?
            .error_for_status()
            .context("scrape feed non-2xx")?;
        let body = resp.text().await.context("read scrape feed body")?;
        Self::parse_body(&body)
    }

    fn name(&self) -> &'static str {
        "http-feed"
    }
}
