// src/store.rs
//! Persistent record of every post identifier the monitor has decided on.
//!
//! On disk: one pretty-printed JSON object keyed by identifier (sorted), with a
//! trailing newline. Loaded whole at cycle start, rewritten whole at cycle end
//! through a temp file + rename, so a failed write never leaves a torn file.
//! `save` of an unmodified `load` reproduces the file byte for byte.
//!
//! The store only grows. Volume is one profile's posts, so no eviction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::ingest::types::parse_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeenStatus {
    Notified,
    SkippedSimilar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub content: String,
    pub date: String,
    pub status: SeenStatus,
    pub decided_at: DateTime<Utc>,
}

// Files written by the earlier monitor kept the decision inside `notified_at`:
// either a timestamp, or the literal "skipped_similar" with `skipped_at` beside it.
#[derive(Debug, Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    content: String,
    #[serde(default)]
    date: Option<String>,
    notified_at: String,
    #[serde(default)]
    skipped_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnyRecord {
    Current(SeenRecord),
    Legacy(LegacyRecord),
}

impl From<AnyRecord> for SeenRecord {
    fn from(any: AnyRecord) -> Self {
        match any {
            AnyRecord::Current(r) => r,
            AnyRecord::Legacy(l) => {
                let (status, ts) = if l.notified_at == "skipped_similar" {
                    (SeenStatus::SkippedSimilar, l.skipped_at)
                } else {
                    (SeenStatus::Notified, Some(l.notified_at))
                };
                SeenRecord {
                    content: l.content,
                    date: l.date.unwrap_or_else(|| "unknown".to_string()),
                    status,
                    decided_at: ts.as_deref().and_then(parse_timestamp).unwrap_or_default(),
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    records: BTreeMap<String, SeenRecord>,
}

impl SeenStore {
    /// Empty in-memory store bound to `path`; nothing is read.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: BTreeMap::new(),
        }
    }

    /// Read persisted state, surfacing what went wrong. A missing file is an empty store.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(target: "store", path = %path.display(), "no seen state yet; starting empty");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        let raw: BTreeMap<String, AnyRecord> = match serde_json::from_slice(&bytes) {
            Ok(m) => m,
            Err(source) => return Err(StoreError::Corrupt { path, source }),
        };
        let records = raw.into_iter().map(|(k, v)| (k, v.into())).collect();
        Ok(Self { path, records })
    }

    /// Like `try_load`, but unreadable or corrupt state degrades to an empty
    /// store with a warning instead of failing the cycle. Previously seen posts
    /// may be re-notified in that case.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(store) => {
                tracing::debug!(target: "store", path = %path.display(), records = store.len(), "seen state loaded");
                store
            }
            Err(e) => {
                tracing::warn!(target: "store", error = %e, "seen state unusable; starting empty");
                Self::empty(path)
            }
        }
    }

    /// Serialized form written by `save`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut buf = serde_json::to_vec_pretty(&self.records)?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Overwrite persisted state with the full in-memory mapping, all or nothing.
    pub fn save(&self) -> Result<(), StoreError> {
        let bytes = self.to_bytes()?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!(target: "store", path = %self.path.display(), records = self.records.len(), "seen state saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&SeenRecord> {
        self.records.get(identifier)
    }

    pub fn records(&self) -> &BTreeMap<String, SeenRecord> {
        &self.records
    }

    /// Every stored content, the cross-cycle comparison corpus. Order is not meaningful.
    pub fn all_contents(&self) -> Vec<String> {
        self.records.values().map(|r| r.content.clone()).collect()
    }

    /// Insert a decision. Decisions are final: an identifier that already has
    /// a record keeps it, and `false` is returned.
    pub fn record(&mut self, identifier: &str, record: SeenRecord) -> bool {
        if self.records.contains_key(identifier) {
            return false;
        }
        self.records.insert(identifier.to_string(), record);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rec(content: &str, status: SeenStatus) -> SeenRecord {
        SeenRecord {
            content: content.into(),
            date: "unknown".into(),
            status,
            decided_at: Utc.with_ymd_and_hms(2025, 4, 10, 9, 1, 0).unwrap(),
        }
    }

    #[test]
    fn missing_file_is_empty_store() {
        let tmp = tempfile::tempdir().unwrap();
        let s = SeenStore::try_load(tmp.path().join("seen.json")).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn corrupt_file_is_typed_error_and_load_recovers() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("seen.json");
        std::fs::write(&p, "{ not json").unwrap();
        assert!(matches!(SeenStore::try_load(&p), Err(StoreError::Corrupt { .. })));
        let s = SeenStore::load(&p);
        assert!(s.is_empty());
        assert_eq!(s.path(), p.as_path());
    }

    #[test]
    fn record_never_overwrites() {
        let mut s = SeenStore::empty("unused.json");
        assert!(s.record("a", rec("first", SeenStatus::Notified)));
        assert!(!s.record("a", rec("second", SeenStatus::SkippedSimilar)));
        let r = s.get("a").unwrap();
        assert_eq!(r.content, "first");
        assert_eq!(r.status, SeenStatus::Notified);
    }

    #[test]
    fn save_creates_parent_dirs_and_reloads() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("data").join("seen.json");
        let mut s = SeenStore::empty(&p);
        s.record("b", rec("bee", SeenStatus::SkippedSimilar));
        s.record("a", rec("ay", SeenStatus::Notified));
        s.save().unwrap();

        let back = SeenStore::try_load(&p).unwrap();
        assert_eq!(back.records(), s.records());
        let mut contents = back.all_contents();
        contents.sort();
        assert_eq!(contents, vec!["ay".to_string(), "bee".to_string()]);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&rec("x", SeenStatus::SkippedSimilar)).unwrap();
        assert!(json.contains(r#""status":"skipped_similar""#), "{json}");
        assert!(json.contains(r#""decided_at":"2025-04-10T09:01:00Z""#), "{json}");
    }

    #[test]
    fn legacy_records_are_upgraded() {
        let legacy = r#"{
          "p1": {"content": "old notified", "date": "Apr 9", "notified_at": "2025-04-09T10:00:00.500000"},
          "p2": {"content": "old skipped", "date": "unknown", "notified_at": "skipped_similar", "skipped_at": "2025-04-09T11:00:00"}
        }"#;
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("seen.json");
        std::fs::write(&p, legacy).unwrap();

        let s = SeenStore::try_load(&p).unwrap();
        let p1 = s.get("p1").unwrap();
        assert_eq!(p1.status, SeenStatus::Notified);
        assert_eq!(p1.date, "Apr 9");
        assert_eq!(
            p1.decided_at,
            Utc.with_ymd_and_hms(2025, 4, 9, 10, 0, 0).unwrap() + chrono::Duration::milliseconds(500)
        );
        let p2 = s.get("p2").unwrap();
        assert_eq!(p2.status, SeenStatus::SkippedSimilar);
        assert_eq!(p2.decided_at, Utc.with_ymd_and_hms(2025, 4, 9, 11, 0, 0).unwrap());
    }
}
