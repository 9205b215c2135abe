//! Structured addresses into JSON value trees.
//!
//! A [`Path`] is a sequence of [`PathStep`]s, each either an object key or an
//! array index. Paths have a canonical string form (`c.d`, `c[1]`, `[1].id`,
//! `""` for the root) used wherever they cross a serialization boundary.
//!
//! # Example
//!
//! ```
//! use json_lww_path::{get, parse_path, Path};
//!
//! let path = parse_path("c[1].id").unwrap();
//! assert_eq!(path, Path::root().key("c").index(1).key("id"));
//! assert_eq!(path.to_string(), "c[1].id");
//!
//! let doc = serde_json::json!({"c": [{"id": 1}, {"id": 2}]});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!(2)));
//! ```

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub mod format;
pub mod get;
pub mod types;

pub use format::{format_path, is_plain_key, is_valid_index, parse_path};
pub use get::{child_steps, get, get_step};
pub use types::{Path, PathStep};

/// Errors produced while parsing a path string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty key at position {pos}")]
    EmptyKey { pos: usize },
    #[error("unterminated bracket at position {pos}")]
    UnterminatedBracket { pos: usize },
    #[error("invalid array index {text:?} at position {pos}")]
    InvalidIndex { pos: usize, text: String },
    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("invalid quoted key at position {pos}")]
    InvalidQuotedKey { pos: usize },
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct PathVisitor;

impl Visitor<'_> for PathVisitor {
    type Value = Path;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a path string such as `a.b[0]`")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Path, E> {
        parse_path(v).map_err(|err| E::custom(format!("invalid path {v:?}: {err}")))
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PathVisitor)
    }
}
