// src/config/recipients.rs
use std::collections::BTreeSet;
use std::path::Path;

pub const ENV_RECIPIENT_EMAIL: &str = "RECIPIENT_EMAIL";

/// Load notification recipients, re-read every cycle so edits apply without a restart.
/// 1) the recipients file, one address per line (`#` comments and blanks skipped)
/// 2) $RECIPIENT_EMAIL when the file is missing, unreadable or empty
pub fn load_recipients(path: &Path) -> Vec<String> {
    let from_file = match std::fs::read_to_string(path) {
        Ok(content) => {
            let list = parse_recipients(&content);
            tracing::debug!(path = %path.display(), count = list.len(), "recipients file loaded");
            list
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "reading recipients file failed");
            Vec::new()
        }
    };
    if !from_file.is_empty() {
        return from_file;
    }

    let fallback: Vec<String> = std::env::var(ENV_RECIPIENT_EMAIL)
        .ok()
        .map(|v| parse_recipients(&v))
        .unwrap_or_default();
    if fallback.is_empty() {
        tracing::warn!("no recipients configured; notifications cannot be delivered");
    }
    fallback
}

fn parse_recipients(content: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for line in content.lines() {
        let addr = line.trim();
        if addr.is_empty() || addr.starts_with('#') {
            continue;
        }
        if seen.insert(addr.to_ascii_lowercase()) {
            out.push(addr.to_string());
        }
    }
    out
}
