//! Structural diff between two value trees.
//!
//! Every ancestor of a changed location receives an [`Change::Update`], so
//! "was this subtree touched after X" can be answered at any depth. Subtrees
//! added under an existing container are stamped all the way down; removed
//! subtrees get a single [`Change::Delete`] at the point of removal and
//! nothing below it. When either side of a pair is a primitive only that
//! path is recorded.

use indexmap::map::{self, IndexMap};
use serde_json::{Map, Value};

use json_lww_path::{child_steps, get_step, Path};

/// What happened at one path.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Update(Value),
    Delete,
}

impl Change {
    pub fn is_delete(&self) -> bool {
        matches!(self, Change::Delete)
    }
}

/// Changes keyed by path, in the order the diff discovered them.
///
/// Parents always precede their children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: IndexMap<Path, Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&Change> {
        self.changes.get(path)
    }

    pub fn iter(&self) -> map::Iter<'_, Path, Change> {
        self.changes.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.changes.keys()
    }

    /// Record a change, replacing any earlier one for the same path but
    /// keeping its original position.
    pub fn record(&mut self, path: Path, change: Change) {
        self.changes.insert(path, change);
    }

    pub fn deletions(&self) -> usize {
        self.changes.values().filter(|c| c.is_delete()).count()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a Path, &'a Change);
    type IntoIter = map::Iter<'a, Path, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = (Path, Change);
    type IntoIter = map::IntoIter<Path, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Compute the changes that turn `old` into `new`.
///
/// # Example
///
/// ```
/// use json_lww::diff::{diff, Change};
/// use json_lww_path::parse_path;
/// use serde_json::json;
///
/// let changes = diff(&json!({"a": 1, "b": 2}), &json!({"a": 1}));
/// assert_eq!(changes.get(&parse_path("b").unwrap()), Some(&Change::Delete));
/// assert!(changes.get(&parse_path("a").unwrap()).is_none());
/// ```
pub fn diff(old: &Value, new: &Value) -> ChangeSet {
    let mut changes = ChangeSet::new();
    let mut path = Path::root();
    diff_at(&mut changes, &mut path, old, new);
    changes
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn diff_at(changes: &mut ChangeSet, path: &mut Path, old: &Value, new: &Value) {
    if old == new {
        return;
    }

    changes.record(path.clone(), Change::Update(new.clone()));

    if !is_container(old) || !is_container(new) {
        return;
    }
    let empty = Value::Object(Map::new());

    let mut steps = child_steps(old);
    for step in child_steps(new) {
        if get_step(old, &step).is_none() {
            steps.push(step);
        }
    }

    for step in steps {
        let old_child = get_step(old, &step);
        let new_child = get_step(new, &step);
        path.push(step);
        match (old_child, new_child) {
            (Some(_), None) => changes.record(path.clone(), Change::Delete),
            (None, Some(added)) => {
                changes.record(path.clone(), Change::Update(added.clone()));
                diff_at(changes, path, &empty, added);
            }
            (Some(before), Some(after)) => {
                if before != after {
                    diff_at(changes, path, before, after);
                }
            }
            (None, None) => {}
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_lww_path::parse_path;
    use serde_json::json;

    fn paths(changes: &ChangeSet) -> Vec<String> {
        changes.paths().map(|p| p.to_string()).collect()
    }

    #[test]
    fn diff_equal_docs() {
        assert!(diff(&json!({"a": [1, {"b": 2}]}), &json!({"a": [1, {"b": 2}]})).is_empty());
    }

    #[test]
    fn diff_object_key_order_is_ignored() {
        let mut a = Map::new();
        a.insert("x".into(), json!(1));
        a.insert("y".into(), json!(2));
        let mut b = Map::new();
        b.insert("y".into(), json!(2));
        b.insert("x".into(), json!(1));
        assert!(diff(&Value::Object(a), &Value::Object(b)).is_empty());
    }

    #[test]
    fn diff_nested_leaf_bumps_ancestors() {
        let changes = diff(
            &json!({"a": 1, "b": 2, "c": {"d": "4"}}),
            &json!({"a": 1, "b": 2, "c": {"d": "5"}}),
        );
        assert_eq!(paths(&changes), vec!["", "c", "c.d"]);
        assert_eq!(
            changes.get(&parse_path("c.d").unwrap()),
            Some(&Change::Update(json!("5")))
        );
    }

    #[test]
    fn diff_deleted_key_recorded_once() {
        let changes = diff(&json!({"a": 1, "b": {"x": {"y": 1}}}), &json!({"a": 1}));
        assert_eq!(paths(&changes), vec!["", "b"]);
        assert_eq!(changes.get(&parse_path("b").unwrap()), Some(&Change::Delete));
        assert_eq!(changes.deletions(), 1);
    }

    #[test]
    fn diff_added_subtree_stamped_to_leaves() {
        let changes = diff(&json!({}), &json!({"n": {"list": [{"id": 1}]}}));
        assert_eq!(paths(&changes), vec!["", "n", "n.list", "n.list[0]", "n.list[0].id"]);
    }

    #[test]
    fn diff_arrays_by_index() {
        let changes = diff(&json!([{"id": 1}, {"id": 2}, 9]), &json!([{"id": 1}, {"id": 3}]));
        assert_eq!(paths(&changes), vec!["", "[1]", "[1].id", "[2]"]);
        assert_eq!(changes.get(&parse_path("[2]").unwrap()), Some(&Change::Delete));
    }

    #[test]
    fn diff_container_kind_change() {
        let changes = diff(&json!({"a": 1}), &json!([5]));
        assert_eq!(paths(&changes), vec!["", "a", "[0]"]);
        assert_eq!(changes.get(&parse_path("a").unwrap()), Some(&Change::Delete));
        assert_eq!(changes.get(&parse_path("[0]").unwrap()), Some(&Change::Update(json!(5))));
    }

    #[test]
    fn diff_primitive_roots() {
        let changes = diff(&json!(3), &json!(4));
        assert_eq!(paths(&changes), vec![""]);
        let changes = diff(&json!(3), &json!({"a": {"b": 1}}));
        assert_eq!(paths(&changes), vec![""]);
        let changes = diff(&json!({"a": 1}), &json!({"a": {"b": 1}}));
        assert_eq!(paths(&changes), vec!["", "a"]);
        let changes = diff(&json!({"a": [1]}), &json!(null));
        assert_eq!(paths(&changes), vec![""]);
    }
}
