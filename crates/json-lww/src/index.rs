//! Per-path modification history.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use json_lww_path::Path;

use crate::clock::Timestamp;
use crate::value::walk;

/// When a path was last touched, and whether that touch removed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampEntry {
    pub timestamp: Timestamp,
    pub deleted: bool,
}

impl TimestampEntry {
    pub const fn live(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            deleted: false,
        }
    }

    pub const fn tombstone(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            deleted: true,
        }
    }
}

/// Maps every path ever observed to its latest [`TimestampEntry`].
///
/// Entries for deleted locations are kept as tombstones. Iteration is in
/// path order, so ancestors come before their descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampIndex {
    entries: BTreeMap<Path, TimestampEntry>,
}

impl TimestampIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp every reachable location of `value` with `now`.
    pub fn from_value(value: &Value, now: Timestamp) -> Self {
        let mut index = Self::new();
        index.fill_missing(value, now);
        index
    }

    pub fn get(&self, path: &Path) -> Option<&TimestampEntry> {
        self.entries.get(path)
    }

    pub fn insert(&mut self, path: Path, entry: TimestampEntry) -> Option<TimestampEntry> {
        self.entries.insert(path, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Path, TimestampEntry> {
        self.entries.iter()
    }

    /// Give a fresh entry to every reachable location that has none.
    ///
    /// Already tracked paths keep their entries. Returns how many entries
    /// were added.
    pub fn fill_missing(&mut self, value: &Value, now: Timestamp) -> usize {
        let mut added = 0;
        walk(value, &mut |path, _| {
            if !self.entries.contains_key(path) {
                self.entries.insert(path.clone(), TimestampEntry::live(now));
                added += 1;
            }
        });
        added
    }
}

impl<'a> IntoIterator for &'a TimestampIndex {
    type Item = (&'a Path, &'a TimestampEntry);
    type IntoIter = btree_map::Iter<'a, Path, TimestampEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(Path, TimestampEntry)> for TimestampIndex {
    fn from_iter<I: IntoIterator<Item = (Path, TimestampEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
