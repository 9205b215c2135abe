//! Logic behind the `lww-*` binaries.
//!
//! - `lww-init`   — wrap a JSON value into a fresh recorder blob
//! - `lww-update` — record a new value against an existing blob
//! - `lww-merge`  — merge a remote blob into a local one
//! - `lww-get`    — show the value and timestamp entry at a path
//! - `lww-sync`   — sync a blob file against a directory-backed store

use std::fs;
use std::path::Path as FsPath;

use serde_json::{json, Value};
use thiserror::Error;

use json_lww_path::{get, parse_path, PathError};

use crate::error::RecorderError;
use crate::merge::MergeOutcome;
use crate::recorder::Recorder;
use crate::sync::{FileStore, SyncConfig, SyncError, SyncOutcome, Syncer};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Recorder(#[from] RecorderError),
    #[error("{0}")]
    Path(#[from] PathError),
    #[error("{0}")]
    Sync(#[from] SyncError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

/// Initialise the `tracing` subscriber used by the binaries.
///
/// Output goes to stderr and is filtered by `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

// ── lww-init ──────────────────────────────────────────────────────────────

/// Parse `json` and return the blob of a new recorder holding it.
pub fn init_blob(json: &str) -> Result<String, CliError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(Recorder::new(value).serialize())
}

// ── lww-update ────────────────────────────────────────────────────────────

/// Record `json` as the new value of the recorder in `blob`.
///
/// Returns the updated blob and the number of changed paths.
pub fn update_blob(blob: &str, json: &str) -> Result<(String, usize), CliError> {
    let mut recorder = Recorder::deserialize(blob)?;
    let value: Value = serde_json::from_str(json)?;
    let changes = recorder.update(value)?;
    Ok((recorder.serialize(), changes.len()))
}

// ── lww-merge ─────────────────────────────────────────────────────────────

pub fn merge_blobs(local: &str, remote: &str) -> Result<(String, MergeOutcome), CliError> {
    let mut local = Recorder::deserialize(local)?;
    let remote = Recorder::deserialize(remote)?;
    let outcome = local.merge(&remote);
    Ok((local.serialize(), outcome))
}

// ── lww-get ───────────────────────────────────────────────────────────────

/// Describe `path` in the recorder held by `blob`.
///
/// The result is `{"path", "value", "entry"}`; `value` and `entry` are
/// `null` when absent.
pub fn lookup(blob: &str, path: &str) -> Result<Value, CliError> {
    let recorder = Recorder::deserialize(blob)?;
    let parsed = parse_path(path)?;
    let value = get(recorder.value(), &parsed).cloned().unwrap_or(Value::Null);
    let entry = recorder.entry(&parsed).map(serde_json::to_value).transpose()?;
    Ok(json!({
        "path": parsed.to_string(),
        "value": value,
        "entry": entry.unwrap_or(Value::Null),
    }))
}

// ── lww-sync ──────────────────────────────────────────────────────────────

/// Sync the blob file at `blob_file` with the store under `store_dir`.
///
/// A missing blob file starts from an empty object. The merged blob is
/// written back to `blob_file`.
pub fn sync_file(
    store_dir: &FsPath,
    blob_file: &FsPath,
    config: SyncConfig,
) -> Result<SyncOutcome, CliError> {
    let mut local = match fs::read_to_string(blob_file) {
        Ok(blob) => Recorder::deserialize(&blob)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Recorder::new(json!({})),
        Err(err) => return Err(err.into()),
    };
    let mut syncer = Syncer::new(FileStore::new(store_dir), config);
    let outcome = syncer.sync(&mut local)?;
    fs::write(blob_file, local.serialize())?;
    Ok(outcome)
}
