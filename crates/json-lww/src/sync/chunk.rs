//! Splitting blobs for stores with a per-value size limit.

use super::store::{Store, StoreError};

/// Iterator over pieces of a string of at most `max_bytes` bytes each.
///
/// Pieces always end on a UTF-8 boundary. A code point wider than
/// `max_bytes` is emitted whole so the iterator always makes progress.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    max_bytes: usize,
}

pub fn chunks(s: &str, max_bytes: usize) -> Chunks<'_> {
    Chunks {
        rest: s,
        max_bytes: max_bytes.max(1),
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let mut end = self.max_bytes.min(self.rest.len());
        while end > 0 && !self.rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = self.rest.chars().next().map_or(self.rest.len(), char::len_utf8);
        }
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(head)
    }
}

/// A store adapter that spreads large blobs over several keys.
///
/// A blob under `key` is written as `{key}-chunk-count` plus
/// `{key}-chunk-0` .. `{key}-chunk-{n-1}`.
#[derive(Debug, Clone)]
pub struct ChunkedStore<S> {
    inner: S,
    max_bytes: usize,
}

impl<S> ChunkedStore<S> {
    pub fn new(inner: S, max_bytes: usize) -> Self {
        Self {
            inner,
            max_bytes: max_bytes.max(1),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn count_key(key: &str) -> String {
    format!("{key}-chunk-count")
}

fn chunk_key(key: &str, idx: usize) -> String {
    format!("{key}-chunk-{idx}")
}

impl<S: Store> Store for ChunkedStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(count) = self.inner.get(&count_key(key))? else {
            return Ok(None);
        };
        let count: usize = count
            .trim()
            .parse()
            .map_err(|_| StoreError::Backend(format!("bad chunk count for {key}: {count:?}")))?;

        let mut blob = String::new();
        for idx in 0..count {
            let piece = self
                .inner
                .get(&chunk_key(key, idx))?
                .ok_or_else(|| StoreError::Backend(format!("missing chunk {idx} of {key}")))?;
            blob.push_str(&piece);
        }
        Ok(Some(blob))
    }

    fn set(&mut self, key: &str, blob: String) -> Result<(), StoreError> {
        let mut count = 0;
        for (idx, piece) in chunks(&blob, self.max_bytes).enumerate() {
            self.inner.set(&chunk_key(key, idx), piece.to_string())?;
            count += 1;
        }
        self.inner.set(&count_key(key), count.to_string())
    }
}
