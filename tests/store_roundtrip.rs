// tests/store_roundtrip.rs
//
// Saving an unmodified load must reproduce the stored bytes exactly.

use chrono::{TimeZone, Utc};
use timeline_monitor::{SeenRecord, SeenStatus, SeenStore};

fn sample(path: &std::path::Path) -> SeenStore {
    let mut s = SeenStore::empty(path);
    s.record(
        "scroll_2_post_4_2025-04-10T09:00:14",
        SeenRecord {
            content: "Quotes \"inside\", unicode — ünïcödé, and a newline\nhere".into(),
            date: "Apr 10, 2025, 7:15 AM".into(),
            status: SeenStatus::SkippedSimilar,
            decided_at: Utc.with_ymd_and_hms(2025, 4, 10, 9, 1, 7).unwrap()
                + chrono::Duration::microseconds(250_001),
        },
    );
    s.record(
        "initial_post_0_2025-04-10T09:00:02",
        SeenRecord {
            content: "Plain post".into(),
            date: "unknown".into(),
            status: SeenStatus::Notified,
            decided_at: Utc.with_ymd_and_hms(2025, 4, 10, 9, 1, 0).unwrap(),
        },
    );
    s
}

#[test]
fn save_of_load_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("seen_posts.json");
    sample(&path).save().unwrap();
    let before = std::fs::read(&path).unwrap();

    SeenStore::try_load(&path).unwrap().save().unwrap();
    let after = std::fs::read(&path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn layout_is_sorted_pretty_json_with_trailing_newline() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("seen_posts.json");
    sample(&path).save().unwrap();
    let text = std::fs::read_to_string(&path).unwrap();

    assert!(text.ends_with("}\n"));
    let first = text.find("initial_post_0").unwrap();
    let second = text.find("scroll_2_post_4").unwrap();
    assert!(first < second, "keys must be sorted");
    assert!(text.contains("\"status\": \"skipped_similar\""));
    assert!(text.contains("\"decided_at\": \"2025-04-10T09:01:07.250001Z\""));
}

#[test]
fn legacy_file_upgrades_once_then_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("seen_posts.json");
    std::fs::write(
        &path,
        r#"{"old": {"content": "c", "date": "unknown", "notified_at": "2025-04-01T08:00:00.000001"}}"#,
    )
    .unwrap();

    SeenStore::try_load(&path).unwrap().save().unwrap();
    let upgraded = std::fs::read(&path).unwrap();
    assert!(String::from_utf8_lossy(&upgraded).contains("\"status\": \"notified\""));

    SeenStore::try_load(&path).unwrap().save().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), upgraded);
}
