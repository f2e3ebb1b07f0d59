// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CandidateError;

/// One scraped observation, as the scraper hands it over. Every field is
/// optional here; `into_candidate` decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawCandidate {
    #[serde(default, alias = "id")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "crawled_at")]
    pub observed_at: Option<String>,
    #[serde(default, alias = "source")]
    pub source_tag: Option<String>,
    #[serde(default, alias = "date")]
    pub published: Option<String>,
}

/// A validated observation. The identifier is unique per observation,
/// not per logical post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub identifier: String,
    pub content: String,
    pub observed_at: DateTime<Utc>,
    pub source_tag: String, // diagnostic only
    pub published: Option<String>,
}

impl Candidate {
    /// Publish date for the seen record; "unknown" when the page had none.
    pub fn published_or_unknown(&self) -> String {
        self.published
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
            .to_string()
    }
}

impl RawCandidate {
    /// `identifier` and non-blank `content` are required. A missing or
    /// unparseable `observed_at` falls back to `fetched_at`.
    pub fn into_candidate(self, fetched_at: DateTime<Utc>) -> Result<Candidate, CandidateError> {
        let identifier = self
            .identifier
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(CandidateError::MissingField("identifier"))?;
        let content = self.content.ok_or(CandidateError::MissingField("content"))?;
        if content.trim().is_empty() {
            return Err(CandidateError::EmptyContent { identifier });
        }
        let observed_at = self
            .observed_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(fetched_at);

        Ok(Candidate {
            identifier,
            content,
            observed_at,
            source_tag: self.source_tag.unwrap_or_else(|| "unknown".to_string()),
            published: self.published,
        })
    }
}

/// Accepts RFC 3339 and zone-less ISO 8601 (taken as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// One array element of a scrape: decoded, or the reason it was not.
pub type RawRecord = Result<RawCandidate, CandidateError>;

/// Port for whatever turns the live profile page into raw candidates.
#[async_trait::async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_candidates(&self) -> Result<Vec<RawRecord>>;
    fn name(&self) -> &'static str;
}
