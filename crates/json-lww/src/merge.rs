//! Path-by-path last-write-wins merge of two recorders.

use serde_json::Value;
use tracing::debug;

use json_lww_path::{get, Path};

use crate::clock::Clock;
use crate::index::TimestampEntry;
use crate::recorder::Recorder;
use crate::value::{delete_at, place_at};

/// What a merge did to the receiving recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Entries taken over from the other side.
    pub adopted: usize,
    /// Of those, how many were tombstones.
    pub deleted: usize,
    /// Newer entries that could not be placed because an ancestor on this
    /// side cannot hold them, or whose value the other side no longer has.
    pub shadowed: usize,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        self.adopted > 0
    }
}

fn is_newer(mine: Option<&TimestampEntry>, theirs: &TimestampEntry) -> bool {
    mine.map_or(true, |mine| mine.timestamp < theirs.timestamp)
}

fn same_container_kind(mine: Option<&Value>, theirs: &Value) -> bool {
    matches!(
        (mine, theirs),
        (Some(Value::Object(_)), Value::Object(_)) | (Some(Value::Array(_)), Value::Array(_))
    )
}

impl<C: Clock> Recorder<C> {
    /// Pull in every path where `other` is strictly newer.
    ///
    /// Equal timestamps keep this side. Only `self` is modified.
    ///
    /// Writes are applied in path order, parents first. A newer container
    /// landing on a container of the same kind only takes over the entry;
    /// its children are settled by their own entries. Anything else is
    /// written whole. Tombstones are applied afterwards in reverse path
    /// order so that splicing trailing array elements does not shift the
    /// ones still to be removed.
    ///
    /// A write is shadowed, and skipped, when this side holds an ancestor
    /// that cannot contain it: a primitive, a container of the other kind,
    /// or a tombstone at least as new as the write. A write past the end of
    /// a local array lands at its current end.
    ///
    /// A tombstone left below an ancestor that was later replaced whole
    /// counts as live once its location holds a value again.
    ///
    /// # Example
    ///
    /// ```
    /// use json_lww::{ManualClock, Recorder};
    /// use serde_json::json;
    ///
    /// let clock = ManualClock::new(1);
    /// let mut local = Recorder::with_clock(json!({"a": 1}), clock.clone());
    /// clock.advance(1);
    /// let remote = Recorder::with_clock(json!({"a": 2}), clock.clone());
    ///
    /// local.merge(&remote);
    /// assert_eq!(local.get_value(), json!({"a": 2}));
    /// ```
    pub fn merge<D>(&mut self, other: &Recorder<D>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let mut tombstones: Vec<(&Path, TimestampEntry)> = Vec::new();

        for (path, _) in other.timestamps.iter() {
            let Some(theirs) = other.effective_entry(path) else {
                continue;
            };
            if !is_newer(self.effective_entry(path).as_ref(), &theirs) {
                continue;
            }
            if theirs.deleted {
                tombstones.push((path, theirs));
                continue;
            }
            let Some(value) = get(&other.value, path) else {
                debug!(%path, "other side no longer holds a value here");
                outcome.shadowed += 1;
                continue;
            };
            if let Some(ancestor) = self.deleted_ancestor(path, &theirs) {
                debug!(%path, %ancestor, "write shadowed by local deletion");
                outcome.shadowed += 1;
                continue;
            }
            let written = if same_container_kind(get(&self.value, path), value) {
                Ok(())
            } else {
                place_at(&mut self.value, path, value.clone())
            };
            match written {
                Ok(()) => {
                    self.timestamps.insert(path.clone(), theirs);
                    outcome.adopted += 1;
                }
                Err(err) => {
                    debug!(%path, %err, "write shadowed by local ancestor");
                    outcome.shadowed += 1;
                }
            }
        }

        for (path, theirs) in tombstones.into_iter().rev() {
            match delete_at(&mut self.value, path) {
                Ok(_) => {
                    self.timestamps.insert(path.clone(), theirs);
                    outcome.adopted += 1;
                    outcome.deleted += 1;
                }
                Err(err) => {
                    debug!(%path, %err, "delete shadowed by local ancestor");
                    outcome.shadowed += 1;
                }
            }
        }

        debug!(
            adopted = outcome.adopted,
            deleted = outcome.deleted,
            shadowed = outcome.shadowed,
            "merged recorder"
        );
        outcome
    }
}

impl<C> Recorder<C> {
    /// The entry at `path` as the merge sees it.
    ///
    /// A tombstone whose location holds a value again was outlived by an
    /// ancestor rewritten whole; it reads as live at the nearest such
    /// ancestor's time.
    fn effective_entry(&self, path: &Path) -> Option<TimestampEntry> {
        let entry = *self.timestamps.get(path)?;
        if !entry.deleted || get(&self.value, path).is_none() {
            return Some(entry);
        }
        let revived = path
            .ancestors()
            .filter_map(|ancestor| self.timestamps.get(&ancestor))
            .filter(|above| !above.deleted && above.timestamp > entry.timestamp)
            .last();
        Some(revived.map_or(entry, |above| TimestampEntry::live(above.timestamp)))
    }

    /// The nearest ancestor of `path` tombstoned here no earlier than
    /// `theirs`.
    fn deleted_ancestor(&self, path: &Path, theirs: &TimestampEntry) -> Option<Path> {
        path.ancestors()
            .filter(|ancestor| {
                self.effective_entry(ancestor)
                    .is_some_and(|mine| mine.deleted && mine.timestamp >= theirs.timestamp)
            })
            .last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, Timestamp};
    use serde_json::json;

    fn fork(r: &Recorder<ManualClock>) -> Recorder<ManualClock> {
        r.clone()
    }

    #[test]
    fn newer_scalar_wins() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"a": 1}), clock.clone());
        clock.advance(1);
        let b = Recorder::with_clock(json!({"a": 2}), clock.clone());
        let outcome = a.merge(&b);
        assert_eq!(a.get_value(), json!({"a": 2}));
        assert!(outcome.changed());
    }

    #[test]
    fn older_side_is_ignored() {
        let clock = ManualClock::new(1);
        let b = Recorder::with_clock(json!({"a": 2}), clock.clone());
        clock.advance(1);
        let mut a = Recorder::with_clock(json!({"a": 1}), clock.clone());
        let outcome = a.merge(&b);
        assert_eq!(a.get_value(), json!({"a": 1}));
        assert_eq!(outcome, MergeOutcome::default());
    }

    #[test]
    fn ties_keep_local_side() {
        let clock = ManualClock::new(5);
        let mut a = Recorder::with_clock(json!({"a": "mine"}), clock.clone());
        let b = Recorder::with_clock(json!({"a": "theirs"}), clock.clone());
        a.merge(&b);
        assert_eq!(a.get_value(), json!({"a": "mine"}));
    }

    #[test]
    fn missing_local_entry_is_adopted_even_when_older() {
        let clock = ManualClock::new(1);
        let b = Recorder::with_clock(json!({"x": {"y": 1}}), clock.clone());
        clock.advance(5);
        let mut a = Recorder::with_clock(json!({}), clock.clone());
        a.merge(&b);
        assert_eq!(a.get_value(), json!({"x": {"y": 1}}));
        assert_eq!(a.get_timestamp("x.y"), Some(Timestamp(1)));
    }

    #[test]
    fn tombstones_propagate() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"a": 1, "b": 2}), clock.clone());
        let mut b = fork(&a);
        clock.advance(1);
        b.update(json!({"a": 1})).unwrap();
        let outcome = a.merge(&b);
        assert_eq!(a.get_value(), json!({"a": 1}));
        assert!(a.get_timestamp_entry("b").unwrap().deleted);
        assert_eq!(outcome.deleted, 1);
    }

    #[test]
    fn trailing_array_deletions_do_not_shift() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"l": ["x", "y", "z"]}), clock.clone());
        let mut b = fork(&a);
        clock.advance(1);
        b.update(json!({"l": ["x"]})).unwrap();
        clock.advance(1);
        a.update(json!({"l": ["X", "y", "z"]})).unwrap();

        a.merge(&b);
        assert_eq!(a.get_value(), json!({"l": ["X"]}));
    }

    #[test]
    fn write_below_newer_local_primitive_is_shadowed() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"a": {"b": 1}}), clock.clone());
        let mut b = fork(&a);
        clock.advance(1);
        b.update(json!({"a": {"b": 2}})).unwrap();
        clock.advance(1);
        a.update(json!({"a": 5})).unwrap();

        let outcome = a.merge(&b);
        assert_eq!(a.get_value(), json!({"a": 5}));
        assert_eq!(outcome.shadowed, 1);

        b.merge(&a);
        assert_eq!(b.get_value(), json!({"a": 5}));
    }

    #[test]
    fn disjoint_edits_under_a_shared_root_both_survive() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"x": {"k": 0}, "y": 0}), clock.clone());
        let mut b = fork(&a);
        clock.advance(1);
        a.update(json!({"x": {"k": 1}, "y": 0})).unwrap();
        clock.advance(1);
        b.update(json!({"x": {"k": 0}, "y": 2})).unwrap();

        let mut a2 = a.clone();
        a2.merge(&b);
        b.merge(&a);
        assert_eq!(a2.get_value(), json!({"x": {"k": 1}, "y": 2}));
        assert_eq!(b.get_value(), a2.get_value());
        assert_eq!(a2.get_timestamp(""), Some(Timestamp(3)));
    }

    #[test]
    fn newer_local_deletion_shadows_remote_write_below_it() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"x": {"k": 0}, "y": 0}), clock.clone());
        let mut b = fork(&a);
        clock.advance(1);
        b.update(json!({"x": {"k": 5}, "y": 0})).unwrap();
        clock.advance(1);
        a.update(json!({"y": 0})).unwrap();

        let mut a2 = a.clone();
        let outcome = a2.merge(&b);
        b.merge(&a);
        assert_eq!(a2.get_value(), json!({"y": 0}));
        assert_eq!(outcome.shadowed, 1);
        assert_eq!(b.get_value(), a2.get_value());
    }

    #[test]
    fn tombstone_under_a_restored_container_reads_as_live() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"a": {"b": 1}}), clock.clone());
        let mut b = fork(&a);
        clock.advance(1);
        a.update(json!({"a": {}})).unwrap();
        clock.advance(1);
        a.update(json!({"a": 1})).unwrap();
        clock.advance(1);
        a.update(json!({"a": {"b": 1}})).unwrap();
        assert!(a.get_timestamp_entry("a.b").unwrap().deleted);

        let mut a2 = a.clone();
        assert_eq!(a2.merge(&b), MergeOutcome::default());
        let outcome = b.merge(&a);
        assert_eq!(b.get_value(), json!({"a": {"b": 1}}));
        assert_eq!(outcome.deleted, 0);
        assert_eq!(b.get_timestamp_entry("a.b"), Some(TimestampEntry::live(Timestamp(4))));
    }

    #[test]
    fn value_removed_by_older_ancestor_tombstone_is_kept() {
        let clock = ManualClock::new(1);
        let mut a = Recorder::with_clock(json!({"a": {"b": 1, "c": 1}}), clock.clone());
        let mut b = fork(&a);
        clock.advance(1);
        b.update(json!({"a": {"b": 2, "c": 1}})).unwrap();
        clock.advance(1);
        b.update(json!({})).unwrap();
        clock.advance(1);
        a.update(json!({"a": {"b": 1, "c": 9}})).unwrap();

        a.merge(&b);
        b.merge(&a);
        assert_eq!(a.get_value(), json!({"a": {"b": 1, "c": 9}}));
        assert_eq!(b.get_value(), a.get_value());
    }
}
