//! Canonical string form of a path.
//!
//! ```text
//! ""            root
//! a             key at the root
//! c.d           nested key
//! c[1]          array element
//! [1].id        key below a root array element
//! ["a.b"][0]    quoted key (empty, or containing . [ ] " \)
//! ```

use std::fmt::Write as _;
use std::str::FromStr;

use crate::types::{Path, PathStep};
use crate::PathError;

/// Check if a key can be written without quoting.
pub fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['.', '[', ']', '"', '\\'])
}

/// Check if a string is a canonical non-negative integer index.
///
/// Leading zeros are rejected so every index has exactly one spelling.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

fn quote_key(key: &str) -> String {
    serde_json::to_string(key).unwrap_or_default()
}

/// Format path steps into the canonical string.
pub fn format_path(steps: &[PathStep]) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        match step {
            PathStep::Key(key) if is_plain_key(key) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathStep::Key(key) => {
                out.push('[');
                out.push_str(&quote_key(key));
                out.push(']');
            }
            PathStep::Index(idx) => {
                let _ = write!(out, "[{idx}]");
            }
        }
    }
    out
}

/// Parse a canonical path string.
///
/// # Errors
///
/// Returns a [`PathError`] describing the first malformed position.
///
/// # Example
///
/// ```
/// use json_lww_path::{parse_path, Path};
///
/// assert_eq!(parse_path("").unwrap(), Path::root());
/// assert_eq!(parse_path("c[1].id").unwrap(), Path::root().key("c").index(1).key("id"));
/// assert!(parse_path("a..b").is_err());
/// ```
pub fn parse_path(text: &str) -> Result<Path, PathError> {
    let bytes = text.as_bytes();
    let mut steps = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'[' => {
                let (step, next) = parse_bracket(text, pos)?;
                steps.push(step);
                pos = next;
            }
            b'.' if !steps.is_empty() => {
                let (key, next) = parse_bare_key(text, pos + 1)?;
                steps.push(PathStep::Key(key));
                pos = next;
            }
            b'.' => return Err(unexpected(text, pos)),
            _ if pos == 0 => {
                let (key, next) = parse_bare_key(text, 0)?;
                steps.push(PathStep::Key(key));
                pos = next;
            }
            _ => return Err(unexpected(text, pos)),
        }
    }

    Ok(Path::from_steps(steps))
}

fn unexpected(text: &str, pos: usize) -> PathError {
    let ch = text[pos..].chars().next().unwrap_or('\0');
    PathError::UnexpectedChar { pos, ch }
}

fn parse_bare_key(text: &str, start: usize) -> Result<(String, usize), PathError> {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() {
        match bytes[end] {
            b'.' | b'[' => break,
            b']' | b'"' | b'\\' => return Err(unexpected(text, end)),
            _ => end += 1,
        }
    }
    if end == start {
        return Err(PathError::EmptyKey { pos: start });
    }
    Ok((text[start..end].to_string(), end))
}

fn parse_bracket(text: &str, open: usize) -> Result<(PathStep, usize), PathError> {
    let bytes = text.as_bytes();
    let body = open + 1;

    if bytes.get(body) == Some(&b'"') {
        let mut i = body + 1;
        loop {
            match bytes.get(i) {
                None => return Err(PathError::UnterminatedBracket { pos: open }),
                Some(b'\\') => i += 2,
                Some(b'"') => break,
                Some(_) => i += 1,
            }
        }
        let key: String = serde_json::from_str(&text[body..=i])
            .map_err(|_| PathError::InvalidQuotedKey { pos: open })?;
        if bytes.get(i + 1) != Some(&b']') {
            return Err(PathError::UnterminatedBracket { pos: open });
        }
        return Ok((PathStep::Key(key), i + 2));
    }

    let close = text[body..]
        .find(']')
        .map(|offset| body + offset)
        .ok_or(PathError::UnterminatedBracket { pos: open })?;
    let digits = &text[body..close];
    if !is_valid_index(digits) {
        return Err(PathError::InvalidIndex {
            pos: open,
            text: digits.to_string(),
        });
    }
    let idx = digits.parse().map_err(|_| PathError::InvalidIndex {
        pos: open,
        text: digits.to_string(),
    })?;
    Ok((PathStep::Index(idx), close + 1))
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}
