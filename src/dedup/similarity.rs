// src/dedup/similarity.rs
//! Token-set Jaccard similarity between post texts.
//!
//! A "word" is a maximal run of Unicode word characters (`\w+`), compared
//! case-insensitively. Only presence counts, not frequency. Two texts where
//! either side has no words score 0.0, so empty or emoji-only scraps are never
//! judged duplicates of each other.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;

pub type WordSet = HashSet<String>;

/// How texts are prepared before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    /// Compare full texts.
    Untrimmed,
    /// Drop this many trailing whitespace-delimited tokens from each side first,
    /// but only from texts that have more tokens than that. Used across cycles,
    /// where the page appends volatile timestamps and engagement counts.
    TrimTrailing(usize),
}

fn word_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("word regex"))
}

pub fn word_set(text: &str) -> WordSet {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn trim_trailing_tokens(text: &str, n: usize) -> Cow<'_, str> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if n == 0 || tokens.len() <= n {
        return Cow::Borrowed(text);
    }
    Cow::Owned(tokens[..tokens.len() - n].join(" "))
}

/// Word set of `text` as seen under `mode`.
pub fn prepared_set(text: &str, mode: SimilarityMode) -> WordSet {
    match mode {
        SimilarityMode::Untrimmed => word_set(text),
        SimilarityMode::TrimTrailing(n) => word_set(&trim_trailing_tokens(text, n)),
    }
}

/// `|A ∩ B| / |A ∪ B|`, 0.0 if either set is empty.
pub fn jaccard(a: &WordSet, b: &WordSet) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}

/// Symmetric similarity in [0, 1].
pub fn similarity(a: &str, b: &str, mode: SimilarityMode) -> f64 {
    jaccard(&prepared_set(a, mode), &prepared_set(b, mode))
}

/// Word sets of a fixed set of texts, prepared once and compared many times.
#[derive(Debug, Clone)]
pub struct Corpus {
    mode: SimilarityMode,
    sets: Vec<WordSet>,
}

impl Corpus {
    pub fn new(mode: SimilarityMode) -> Self {
        Self {
            mode,
            sets: Vec::new(),
        }
    }

    pub fn build<I, S>(texts: I, mode: SimilarityMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sets = texts
            .into_iter()
            .map(|t| prepared_set(t.as_ref(), mode))
            .collect();
        Self { mode, sets }
    }

    pub fn push(&mut self, text: &str) {
        self.sets.push(prepared_set(text, self.mode));
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// First score at or above `threshold` against any member, if one exists.
    pub fn find_similar(&self, text: &str, threshold: f64) -> Option<f64> {
        let candidate = prepared_set(text, self.mode);
        self.sets
            .iter()
            .map(|s| jaccard(&candidate, s))
            .find(|score| *score >= threshold)
    }
}
