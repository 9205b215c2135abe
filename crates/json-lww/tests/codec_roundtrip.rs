mod common;

use common::arb_json;
use json_lww::{ManualClock, Recorder, RecorderError, Snapshot, Timestamp};
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn quoted_keys_survive_the_blob() {
    let doc = Recorder::with_clock(json!({"a.b": {"": [1]}, "x[0]": true}), ManualClock::new(5));
    let blob: Value = serde_json::from_str(&doc.serialize()).unwrap();

    let mut keys: Vec<&str> = blob["timestamps"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["", r#"["a.b"]"#, r#"["a.b"][""]"#, r#"["a.b"][""][0]"#, r#"["x[0]"]"#]
    );

    let restored = Recorder::deserialize(&doc.serialize()).unwrap();
    assert_eq!(restored.get_timestamp(r#"["a.b"][""][0]"#), Some(Timestamp(5)));
}

#[test]
fn large_timestamps_are_kept_exactly() {
    let millis = (1u64 << 53) + 1;
    let doc = Recorder::with_clock(json!({"a": 1}), ManualClock::new(millis));
    let restored = Recorder::deserialize(&doc.serialize()).unwrap();
    assert_eq!(restored.get_timestamp("a"), Some(Timestamp(millis)));
}

#[test]
fn snapshot_is_the_blob_shape() {
    let doc = Recorder::with_clock(json!([null]), ManualClock::new(2));
    let snapshot: Snapshot = serde_json::from_str(&doc.serialize()).unwrap();
    assert_eq!(snapshot, doc.snapshot());
    let rebuilt = Recorder::from_snapshot(snapshot, ManualClock::new(100));
    assert_eq!(rebuilt.get_timestamp("[0]"), Some(Timestamp(2)));
}

#[test]
fn embedded_index_is_taken_verbatim() {
    // The value holds a path the index never heard of; it stays untracked.
    let blob = r#"{"value": {"a": 1, "b": 2}, "timestamps": {"a": {"timestamp": 3, "deleted": false}}}"#;
    let doc = Recorder::deserialize(blob).unwrap();
    assert_eq!(doc.timestamps().len(), 1);
    assert_eq!(doc.get_timestamp("b"), None);
}

#[test]
fn bad_path_key_is_malformed_input() {
    let blob = r#"{"value": {}, "timestamps": {"a[01]": {"timestamp": 1, "deleted": false}}}"#;
    assert!(matches!(Recorder::deserialize(blob), Err(RecorderError::MalformedInput(_))));
}

proptest! {
    #[test]
    fn blob_roundtrip_preserves_value_and_index(first in arb_json(), second in arb_json()) {
        let clock = ManualClock::new(1);
        let mut doc = Recorder::with_clock(first, clock.clone());
        clock.advance(1);
        doc.update(second).unwrap();

        let restored = Recorder::deserialize(&doc.serialize()).unwrap();
        prop_assert_eq!(restored.get_value(), doc.get_value());
        prop_assert_eq!(restored.timestamps(), doc.timestamps());
    }
}
