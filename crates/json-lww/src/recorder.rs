//! The recorder: one value tree plus its per-path timestamp history.

use serde_json::Value;
use tracing::debug;

use json_lww_path::{parse_path, Path};

use crate::clock::{Clock, SystemClock, Timestamp};
use crate::diff::{diff, Change, ChangeSet};
use crate::error::RecorderResult;
use crate::index::{TimestampEntry, TimestampIndex};
use crate::value::{delete_at, set_at};

/// Tracks a JSON document and when each of its paths last changed.
///
/// A recorder exclusively owns its value and index. Sharing one across
/// threads needs external locking around every `update`/`merge` sequence.
///
/// # Example
///
/// ```
/// use json_lww::{ManualClock, Recorder};
/// use serde_json::json;
///
/// let clock = ManualClock::new(1);
/// let mut doc = Recorder::with_clock(json!({"a": 1, "b": 2}), clock.clone());
///
/// clock.advance(1);
/// doc.update(json!({"a": 1})).unwrap();
///
/// assert_eq!(doc.get_value(), json!({"a": 1}));
/// assert!(doc.get_timestamp_entry("b").unwrap().deleted);
/// ```
#[derive(Debug, Clone)]
pub struct Recorder<C = SystemClock> {
    pub(crate) value: Value,
    pub(crate) timestamps: TimestampIndex,
    pub(crate) clock: C,
}

impl Recorder<SystemClock> {
    /// Start tracking `initial`, stamping every location with the current
    /// wall-clock time.
    pub fn new(initial: Value) -> Self {
        Self::with_clock(initial, SystemClock)
    }
}

impl<C: Clock> Recorder<C> {
    pub fn with_clock(initial: Value, clock: C) -> Self {
        let now = clock.now();
        let timestamps = TimestampIndex::from_value(&initial, now);
        Self {
            value: initial,
            timestamps,
            clock,
        }
    }

    /// Preview the changes `update(new_value)` would record.
    pub fn diff(&self, new_value: &Value) -> ChangeSet {
        diff(&self.value, new_value)
    }

    /// Replace the current value, stamping every changed path.
    ///
    /// All changes share one timestamp. They are applied to a staged copy
    /// first, so on error neither the value nor the index is modified.
    /// Returns the applied changes; an unchanged value yields an empty set.
    pub fn update(&mut self, new_value: Value) -> RecorderResult<ChangeSet> {
        let changes = diff(&self.value, &new_value);
        let now = self.clock.now();

        if !changes.is_empty() {
            let mut staged = self.value.clone();
            for (path, change) in &changes {
                apply_change(&mut staged, path, change)?;
            }
            self.value = staged;

            for (path, change) in &changes {
                let entry = match change {
                    Change::Update(_) => TimestampEntry::live(now),
                    Change::Delete => TimestampEntry::tombstone(now),
                };
                self.timestamps.insert(path.clone(), entry);
            }
        }

        let added = self.timestamps.fill_missing(&new_value, now);
        debug!(
            changes = changes.len(),
            deletions = changes.deletions(),
            added,
            %now,
            "recorded update"
        );
        Ok(changes)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// A deep copy of the current value.
    pub fn get_value(&self) -> Value {
        self.value.clone()
    }

    pub fn timestamps(&self) -> &TimestampIndex {
        &self.timestamps
    }

    pub fn entry(&self, path: &Path) -> Option<&TimestampEntry> {
        self.timestamps.get(path)
    }

    /// Look up the entry for a canonical path string such as `c[1].id`.
    ///
    /// A string that is not a valid path has no entry.
    pub fn get_timestamp_entry(&self, path: &str) -> Option<TimestampEntry> {
        let path = parse_path(path).ok()?;
        self.timestamps.get(&path).copied()
    }

    pub fn get_timestamp(&self, path: &str) -> Option<Timestamp> {
        self.get_timestamp_entry(path).map(|entry| entry.timestamp)
    }
}

fn apply_change(value: &mut Value, path: &Path, change: &Change) -> RecorderResult<()> {
    match change {
        Change::Update(new) => set_at(value, path, new.clone()),
        Change::Delete => delete_at(value, path).map(|_| ()),
    }
}
