// src/ingest/mod.rs
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};

use anyhow::{Context, Result};

use crate::error::CandidateError;
use crate::ingest::types::{Candidate, RawCandidate, RawRecord};

/// Canonical comparable form: whitespace runs collapsed to one space, lowercased.
/// Idempotent; no stemming and no punctuation stripping.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Short prefix of a post for log lines; never log whole posts.
pub fn preview(s: &str) -> String {
    const MAX: usize = 50;
    let mut out: String = s.chars().take(MAX).collect();
    if s.chars().nth(MAX).is_some() {
        out.push_str("...");
    }
    out
}

/// Decode a scraped JSON array element by element. Only a body that is not a
/// JSON array fails as a whole; a bad element (wrong field type, `null`, ...)
/// becomes an `Err` record and is dropped later by `validate_batch`.
pub fn decode_candidates(body: &str) -> Result<Vec<RawRecord>> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(body).context("candidate batch is not a JSON array")?;
    Ok(items
        .into_iter()
        .map(|v| {
            serde_json::from_value::<RawCandidate>(v)
                .map_err(|e| CandidateError::Undecodable(e.to_string()))
        })
        .collect())
}

/// Turn raw scraper output into candidates, dropping malformed records one by one.
/// Returns (candidates, malformed_count).
pub fn validate_batch(raw: Vec<RawRecord>, fetched_at: DateTime<Utc>) -> (Vec<Candidate>, usize) {
    let mut out = Vec::with_capacity(raw.len());
    let mut malformed = 0usize;
    for (idx, r) in raw.into_iter().enumerate() {
        match r.and_then(|r| r.into_candidate(fetched_at)) {
            Ok(c) => out.push(c),
            Err(e) => {
                malformed += 1;
                tracing::warn!(target: "ingest", index = idx, error = %e, "dropping malformed candidate");
            }
        }
    }
    (out, malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_ws_and_lowercases() {
        let s = "  Hello,\u{00A0}\n\tWORLD   again ";
        assert_eq!(normalize_text(s), "hello, world again");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Already normal",
            "MiXeD\tCase\r\nLines  and  · dots",
            "Ünïcödé ΣΊΣΥΦΟΣ  straße",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let s = "é".repeat(60);
        let p = preview(&s);
        assert_eq!(p.chars().count(), 53);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn validate_drops_only_malformed() {
        let raw = vec![
            Ok(RawCandidate {
                identifier: Some("a".into()),
                content: Some("first".into()),
                ..Default::default()
            }),
            Ok(RawCandidate {
                content: Some("no id".into()),
                ..Default::default()
            }),
            Err(CandidateError::Undecodable("null".into())),
            Ok(RawCandidate {
                identifier: Some("c".into()),
                content: Some("third".into()),
                ..Default::default()
            }),
        ];
        let (ok, bad) = validate_batch(raw, Utc::now());
        assert_eq!(bad, 2);
        let ids: Vec<_> = ok.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn one_bad_element_does_not_sink_the_batch() {
        let body = r#"[
            {"id": "good", "content": "A perfectly fine scraped post"},
            {"id": 12345, "content": "numeric identifier"},
            null,
            {"id": "also-good", "content": "Another fine post"}
        ]"#;
        let raw = decode_candidates(body).unwrap();
        assert_eq!(raw.len(), 4);
        assert!(matches!(raw[1], Err(CandidateError::Undecodable(_))));
        assert!(matches!(raw[2], Err(CandidateError::Undecodable(_))));

        let (ok, bad) = validate_batch(raw, Utc::now());
        assert_eq!(bad, 2);
        let ids: Vec<_> = ok.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["good", "also-good"]);
    }

    #[test]
    fn non_array_body_fails_as_a_whole() {
        assert!(decode_candidates(r#"{"id": "x"}"#).is_err());
        assert!(decode_candidates("[{").is_err());
    }
}
