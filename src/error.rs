// src/error.rs
//! Typed failures of the novelty core. Glue code (config, sources, notifiers)
//! stays on `anyhow`; these are the errors callers are expected to match on.

use std::path::PathBuf;

/// Persisted seen-state could not be read, parsed or written.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("reading seen state from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("seen state at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("writing seen state to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding seen state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A scraped record that cannot become a `Candidate`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("candidate is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("candidate {identifier} has empty content")]
    EmptyContent { identifier: String },

    #[error("candidate could not be decoded: {0}")]
    Undecodable(String),
}

/// Reasons a whole cycle ends without persisting.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("candidate source failed: {0:#}")]
    Source(anyhow::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
