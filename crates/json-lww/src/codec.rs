//! Blob encoding of a recorder: `{"value": ..., "timestamps": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::error::RecorderResult;
use crate::index::TimestampIndex;
use crate::recorder::Recorder;

/// The persisted shape of a recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub value: Value,
    pub timestamps: TimestampIndex,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    value: &'a Value,
    timestamps: &'a TimestampIndex,
}

impl Recorder<SystemClock> {
    /// Restore a recorder from [`Recorder::serialize`] output.
    ///
    /// # Errors
    ///
    /// `MalformedInput` if the blob is not a `{value, timestamps}` document,
    /// a path key does not parse, or a timestamp is not a non-negative
    /// integer.
    pub fn deserialize(blob: &str) -> RecorderResult<Self> {
        Self::deserialize_with_clock(blob, SystemClock)
    }
}

impl<C: Clock> Recorder<C> {
    pub fn serialize(&self) -> String {
        serde_json::to_string(&SnapshotRef {
            value: &self.value,
            timestamps: &self.timestamps,
        })
        .expect("map keys are path strings and timestamps are integers")
    }

    pub fn deserialize_with_clock(blob: &str, clock: C) -> RecorderResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(blob)?;
        Ok(Self::from_snapshot(snapshot, clock))
    }

    /// Rebuild a recorder, keeping the embedded timestamps verbatim.
    pub fn from_snapshot(snapshot: Snapshot, clock: C) -> Self {
        let mut recorder = Self::with_clock(snapshot.value, clock);
        recorder.timestamps = snapshot.timestamps;
        recorder
    }

    /// Replace this recorder's value and history, keeping its clock.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.value = snapshot.value;
        self.timestamps = snapshot.timestamps;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            value: self.value.clone(),
            timestamps: self.timestamps.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, Timestamp};
    use crate::error::RecorderError;
    use serde_json::json;

    #[test]
    fn serialize_layout() {
        let doc = Recorder::with_clock(json!({"a": [true]}), ManualClock::new(1_700_000_000_001));
        let blob: Value = serde_json::from_str(&doc.serialize()).unwrap();
        assert_eq!(
            blob,
            json!({
                "value": {"a": [true]},
                "timestamps": {
                    "": {"timestamp": 1_700_000_000_001u64, "deleted": false},
                    "a": {"timestamp": 1_700_000_000_001u64, "deleted": false},
                    "a[0]": {"timestamp": 1_700_000_000_001u64, "deleted": false},
                }
            })
        );
    }

    #[test]
    fn deserialize_keeps_embedded_timestamps() {
        let clock = ManualClock::new(1);
        let mut doc = Recorder::with_clock(json!({"a": 1, "b": 2}), clock.clone());
        clock.advance(1);
        doc.update(json!({"a": 1})).unwrap();

        clock.set(99);
        let restored = Recorder::deserialize_with_clock(&doc.serialize(), clock.clone()).unwrap();
        assert_eq!(restored.get_value(), json!({"a": 1}));
        assert_eq!(restored.timestamps(), doc.timestamps());
        assert_eq!(restored.get_timestamp("a"), Some(Timestamp(1)));
        assert!(restored.get_timestamp_entry("b").unwrap().deleted);
    }

    #[test]
    fn deserialize_rejects_malformed_blobs() {
        let cases = [
            "",
            "not json",
            "[]",
            r#"{"value": 1}"#,
            r#"{"timestamps": {}}"#,
            r#"{"value": 1, "timestamps": {"": {"timestamp": 1.5, "deleted": false}}}"#,
            r#"{"value": 1, "timestamps": {"": {"timestamp": -3, "deleted": false}}}"#,
            r#"{"value": 1, "timestamps": {"": {"timestamp": "1", "deleted": false}}}"#,
            r#"{"value": 1, "timestamps": {"": {"timestamp": 1}}}"#,
            r#"{"value": {}, "timestamps": {"a..b": {"timestamp": 1, "deleted": false}}}"#,
        ];
        for blob in cases {
            let err = Recorder::deserialize(blob).unwrap_err();
            assert!(matches!(err, RecorderError::MalformedInput(_)), "{blob}");
        }
    }

    #[test]
    fn deserialize_ignores_unknown_top_level_fields() {
        let blob = r#"{"value": 3, "timestamps": {"": {"timestamp": 4, "deleted": false}}, "version": 2}"#;
        let doc = Recorder::deserialize(blob).unwrap();
        assert_eq!(doc.get_value(), json!(3));
        assert_eq!(doc.get_timestamp(""), Some(Timestamp(4)));
    }
}
