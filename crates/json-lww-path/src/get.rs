use serde_json::Value;

use crate::types::{Path, PathStep};

/// Get a child of a container by a single step.
///
/// A key step on an array or an index step on an object addresses nothing.
pub fn get_step<'a>(val: &'a Value, step: &PathStep) -> Option<&'a Value> {
    match (val, step) {
        (Value::Object(map), PathStep::Key(key)) => map.get(key),
        (Value::Array(arr), PathStep::Index(idx)) => arr.get(*idx),
        _ => None,
    }
}

/// Get a value from a JSON document by path.
pub fn get<'a>(val: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = val;
    for step in path.steps() {
        current = get_step(current, step)?;
    }
    Some(current)
}

/// List the steps addressing the direct children of a container.
///
/// Primitives have no children.
pub fn child_steps(val: &Value) -> Vec<PathStep> {
    match val {
        Value::Object(map) => map.keys().cloned().map(PathStep::Key).collect(),
        Value::Array(arr) => (0..arr.len()).map(PathStep::Index).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let doc = json!({"c": [{"id": 1}, {"id": 2}]});
        let path = Path::root().key("c").index(1).key("id");
        assert_eq!(get(&doc, &path), Some(&json!(2)));
        assert_eq!(get(&doc, &Path::root()), Some(&doc));
    }

    #[test]
    fn test_get_kind_mismatch() {
        let doc = json!({"a": [1], "0": "zero"});
        assert_eq!(get(&doc, &Path::root().key("a").key("0")), None);
        assert_eq!(get(&doc, &Path::root().index(0)), None);
        assert_eq!(get(&doc, &Path::root().key("0")), Some(&json!("zero")));
    }
}
