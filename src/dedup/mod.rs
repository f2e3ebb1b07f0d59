// src/dedup/mod.rs
pub mod batch;
pub mod similarity;

pub use batch::{BatchReport, IntraBatchDeduplicator};
pub use similarity::{similarity, Corpus, SimilarityMode};
