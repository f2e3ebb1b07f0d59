// src/config/monitor.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

pub const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";
pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";

pub const ENV_INTERVAL_MINUTES: &str = "CHECK_INTERVAL_MINUTES";
pub const ENV_DATA_FILE: &str = "DATA_FILE";
pub const ENV_SIMILARITY_THRESHOLD: &str = "SIMILARITY_THRESHOLD";

pub const DEFAULT_PROFILE_URL: &str = "https://truthsocial.com/@realDonaldTrump";

fn default_threshold() -> f64 {
    0.70
}
fn default_min_batch_chars() -> usize {
    20
}
fn default_min_novel_chars() -> usize {
    100
}
fn default_trim_tokens() -> usize {
    3
}
fn default_store_path() -> PathBuf {
    PathBuf::from("data/seen_posts.json")
}
fn default_interval_minutes() -> u64 {
    60
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_profile_url() -> String {
    DEFAULT_PROFILE_URL.to_string()
}
fn default_fixture_path() -> PathBuf {
    PathBuf::from("data/candidates.json")
}
fn default_recipients_file() -> PathBuf {
    PathBuf::from("config/recipients.txt")
}
fn default_subject_prefix() -> String {
    "New posts".to_string()
}
fn default_summary_prompt() -> String {
    "Summarize the following posts:".to_string()
}
fn default_translation_prompt() -> String {
    "Translate the following posts into Traditional Chinese:".to_string()
}

/// Knobs shared by the intra-batch and cross-cycle duplicate checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Jaccard score at or above which two posts are the same logical post.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
    /// Candidates shorter than this (normalized, in chars) never enter a batch.
    #[serde(default = "default_min_batch_chars")]
    pub min_batch_chars: usize,
    /// Posts shorter than this are treated as media-only and never notified.
    #[serde(default = "default_min_novel_chars")]
    pub min_novel_chars: usize,
    /// Trailing tokens dropped before cross-cycle comparison.
    #[serde(default = "default_trim_tokens")]
    pub trailing_trim_tokens: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            min_batch_chars: default_min_batch_chars(),
            min_novel_chars: default_min_novel_chars(),
            trailing_trim_tokens: default_trim_tokens(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Fixture,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// JSON array of scraped candidates (fixture kind).
    #[serde(default = "default_fixture_path")]
    pub fixture_path: PathBuf,
    /// Scraper sidecar endpoint returning a JSON array (http kind).
    #[serde(default)]
    pub feed_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_profile_url")]
    pub profile_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            fixture_path: default_fixture_path(),
            feed_url: None,
            timeout_secs: default_timeout_secs(),
            profile_url: default_profile_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_recipients_file")]
    pub recipients_file: PathBuf,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    #[serde(default = "default_summary_prompt")]
    pub summary_prompt: String,
    #[serde(default = "default_translation_prompt")]
    pub translation_prompt: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            recipients_file: default_recipients_file(),
            subject_prefix: default_subject_prefix(),
            summary_prompt: default_summary_prompt(),
            translation_prompt: default_translation_prompt(),
        }
    }
}

/// Root configuration, built once at startup and handed to each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl MonitorConfig {
    /// Parse a TOML document, then apply env overrides and sanitize.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: MonitorConfig = toml::from_str(s).context("parsing monitor config")?;
        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading monitor config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Resolve the config file:
    /// 1) $MONITOR_CONFIG_PATH (must exist)
    /// 2) config/monitor.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from_file(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from_file(&default_path);
        }
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(mins) = parse_env::<u64>(ENV_INTERVAL_MINUTES) {
            self.schedule.interval_minutes = mins;
        }
        if let Ok(path) = env::var(ENV_DATA_FILE) {
            if !path.trim().is_empty() {
                self.store.path = PathBuf::from(path.trim());
            }
        }
        if let Some(t) = parse_env::<f64>(ENV_SIMILARITY_THRESHOLD) {
            self.dedup.similarity_threshold = t;
        }
    }

    fn sanitize(&mut self) {
        let t = self.dedup.similarity_threshold;
        self.dedup.similarity_threshold = if t.is_finite() {
            t.clamp(0.0, 1.0)
        } else {
            default_threshold()
        };
        self.schedule.interval_minutes = self.schedule.interval_minutes.max(1);
        self.source.timeout_secs = self.source.timeout_secs.max(1);
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn empty_document_yields_defaults() {
        env::remove_var(ENV_INTERVAL_MINUTES);
        env::remove_var(ENV_DATA_FILE);
        env::remove_var(ENV_SIMILARITY_THRESHOLD);

        let cfg = MonitorConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, MonitorConfig::default());
        assert_eq!(cfg.dedup.similarity_threshold, 0.70);
        assert_eq!(cfg.dedup.min_batch_chars, 20);
        assert_eq!(cfg.dedup.min_novel_chars, 100);
        assert_eq!(cfg.dedup.trailing_trim_tokens, 3);
    }

    #[serial_test::serial]
    #[test]
    fn out_of_range_values_are_sanitized() {
        env::remove_var(ENV_INTERVAL_MINUTES);
        env::remove_var(ENV_SIMILARITY_THRESHOLD);

        let toml = r#"
            [dedup]
            similarity_threshold = 1.7

            [schedule]
            interval_minutes = 0
        "#;
        let cfg = MonitorConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.dedup.similarity_threshold, 1.0);
        assert_eq!(cfg.schedule.interval_minutes, 1);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_file_values() {
        env::set_var(ENV_INTERVAL_MINUTES, "15");
        env::set_var(ENV_DATA_FILE, "state/seen.json");
        env::set_var(ENV_SIMILARITY_THRESHOLD, "0.8");

        let cfg = MonitorConfig::from_toml_str("[schedule]\ninterval_minutes = 90\n").unwrap();

        env::remove_var(ENV_INTERVAL_MINUTES);
        env::remove_var(ENV_DATA_FILE);
        env::remove_var(ENV_SIMILARITY_THRESHOLD);

        assert_eq!(cfg.schedule.interval_minutes, 15);
        assert_eq!(cfg.store.path, PathBuf::from("state/seen.json"));
        assert_eq!(cfg.dedup.similarity_threshold, 0.8);
    }
}
