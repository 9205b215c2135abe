//! Structural writes and traversal on JSON value trees.

use serde_json::{Map, Value};

use json_lww_path::{Path, PathStep};

use crate::error::{RecorderError, RecorderResult};

fn empty_container_for(next: &PathStep) -> Value {
    match next {
        PathStep::Index(_) => Value::Array(Vec::new()),
        PathStep::Key(_) => Value::Object(Map::new()),
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// How an array write past the end of the array is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    /// Pad with `null` up to the index.
    Pad,
    /// Append at the current end, whatever the index.
    Append,
}

/// Write `value` at `path`, creating missing intermediate containers.
///
/// A missing intermediate becomes an array when the step below it is an
/// index and an object otherwise. Array writes past the end pad with `null`.
///
/// Fails only while walking nodes that already exist, so an error leaves
/// `root` untouched.
pub fn set_at(root: &mut Value, path: &Path, value: Value) -> RecorderResult<()> {
    write_at(root, path, value, Gap::Pad)
}

/// Like [`set_at`], but array writes past the end append instead of
/// padding, so no element appears that nobody wrote.
pub fn place_at(root: &mut Value, path: &Path, value: Value) -> RecorderResult<()> {
    write_at(root, path, value, Gap::Append)
}

fn write_at(root: &mut Value, path: &Path, value: Value, gap: Gap) -> RecorderResult<()> {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (i, step) in parents.iter().enumerate() {
        let next = parents.get(i + 1).unwrap_or(last);
        current = match (current, step) {
            (Value::Object(map), PathStep::Key(key)) => map
                .entry(key.clone())
                .or_insert_with(|| empty_container_for(next)),
            (Value::Array(arr), PathStep::Index(idx)) => {
                let slot = extend_to(arr, *idx, gap, || empty_container_for(next));
                &mut arr[slot]
            }
            (node, _) if is_container(node) => return Err(RecorderError::kind_mismatch(path)),
            _ => return Err(RecorderError::through_primitive(path)),
        };
    }

    match (current, last) {
        (Value::Object(map), PathStep::Key(key)) => {
            map.insert(key.clone(), value);
        }
        (Value::Array(arr), PathStep::Index(idx)) => {
            if *idx < arr.len() {
                arr[*idx] = value;
            } else {
                extend_to(arr, *idx, gap, || value);
            }
        }
        (node, _) if is_container(node) => return Err(RecorderError::kind_mismatch(path)),
        _ => return Err(RecorderError::through_primitive(path)),
    }
    Ok(())
}

/// Make sure `arr` has a slot for `idx`, filling it with `fill()` if it
/// has to grow. Returns the slot's actual position.
fn extend_to<F>(arr: &mut Vec<Value>, idx: usize, gap: Gap, fill: F) -> usize
where
    F: FnOnce() -> Value,
{
    if idx < arr.len() {
        return idx;
    }
    if gap == Gap::Pad {
        arr.resize(idx, Value::Null);
    }
    arr.push(fill());
    arr.len() - 1
}

/// Remove the node at `path`, returning it if it existed.
///
/// Object members are removed by key; array elements are spliced out, so
/// later elements shift down. Deleting the root resets it to `null`.
/// A location that does not exist is a no-op.
pub fn delete_at(root: &mut Value, path: &Path) -> RecorderResult<Option<Value>> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(Some(std::mem::replace(root, Value::Null)));
    };

    let mut current = root;
    for step in parents {
        current = match (current, step) {
            (Value::Object(map), PathStep::Key(key)) => match map.get_mut(key) {
                Some(child) => child,
                None => return Ok(None),
            },
            (Value::Array(arr), PathStep::Index(idx)) => match arr.get_mut(*idx) {
                Some(child) => child,
                None => return Ok(None),
            },
            (node, _) if is_container(node) => return Ok(None),
            _ => return Err(RecorderError::through_primitive(path)),
        };
    }

    match (current, last) {
        (Value::Object(map), PathStep::Key(key)) => Ok(map.remove(key)),
        (Value::Array(arr), PathStep::Index(idx)) => {
            if *idx < arr.len() {
                Ok(Some(arr.remove(*idx)))
            } else {
                Ok(None)
            }
        }
        (node, _) if is_container(node) => Ok(None),
        _ => Err(RecorderError::through_primitive(path)),
    }
}

/// Visit every reachable location in pre-order, the root first.
pub fn walk<F>(value: &Value, visit: &mut F)
where
    F: FnMut(&Path, &Value),
{
    let mut path = Path::root();
    walk_at(value, &mut path, visit);
}

fn walk_at<F>(value: &Value, path: &mut Path, visit: &mut F)
where
    F: FnMut(&Path, &Value),
{
    visit(path, value);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(PathStep::Key(key.clone()));
                walk_at(child, path, visit);
                path.pop();
            }
        }
        Value::Array(arr) => {
            for (idx, child) in arr.iter().enumerate() {
                path.push(PathStep::Index(idx));
                walk_at(child, path, visit);
                path.pop();
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}
