//! Keeping a recorder in step with a copy held in a [`Store`].
//!
//! The flow is pull, merge, push: fetch the remote blob, merge it into the
//! local recorder, upload the merged result. Stores, envelopes and
//! configuration are supplied by the host; nothing here talks to a network.

pub mod chunk;
pub mod config;
pub mod envelope;
pub mod store;

use thiserror::Error;
use tracing::{info, warn};

use crate::clock::{Clock, Timestamp};
use crate::codec::Snapshot;
use crate::error::RecorderError;
use crate::merge::MergeOutcome;
use crate::recorder::Recorder;

pub use chunk::{chunks, ChunkedStore, Chunks};
pub use config::{ConfigError, SyncConfig};
pub use envelope::{Envelope, EnvelopeError, Plain};
pub use store::{FileStore, MemoryStore, Store, StoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Recorder(#[from] RecorderError),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("blob uploaded under {key:?} did not read back identically")]
    UploadMismatch { key: String },
}

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The store was empty; the local blob was uploaded as is.
    Uploaded,
    /// The remote blob was merged in and the result uploaded.
    Merged(MergeOutcome),
}

pub struct Syncer<S, E = Plain> {
    store: S,
    envelope: E,
    config: SyncConfig,
    last_sync: Option<Timestamp>,
}

impl<S: Store> Syncer<S, Plain> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        Self::with_envelope(store, Plain, config)
    }
}

impl<S: Store, E: Envelope> Syncer<S, E> {
    pub fn with_envelope(store: S, envelope: E, config: SyncConfig) -> Self {
        Self {
            store,
            envelope,
            config,
            last_sync: None,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Local clock reading at the end of the last successful sync or
    /// override.
    pub fn last_sync(&self) -> Option<Timestamp> {
        self.last_sync
    }

    /// Merge the stored copy into `local` and upload the result.
    ///
    /// When the store holds nothing, `local` is uploaded unchanged.
    pub fn sync<C: Clock>(&mut self, local: &mut Recorder<C>) -> SyncResult<SyncOutcome> {
        let outcome = match self.fetch()? {
            None => {
                info!(key = %self.config.key, "remote is empty, uploading local state");
                SyncOutcome::Uploaded
            }
            Some(blob) => {
                let remote = Recorder::deserialize(&blob)?;
                SyncOutcome::Merged(local.merge(&remote))
            }
        };
        self.upload(local.serialize())?;
        self.last_sync = Some(local.clock().now());
        info!(key = %self.config.key, ?outcome, "sync finished");
        Ok(outcome)
    }

    /// Overwrite the stored copy with `local`.
    pub fn override_remote<C: Clock>(&mut self, local: &Recorder<C>) -> SyncResult<()> {
        self.upload(local.serialize())?;
        self.last_sync = Some(local.clock().now());
        info!(key = %self.config.key, "remote overridden");
        Ok(())
    }

    /// Replace `local` with the stored copy.
    ///
    /// Returns `false`, leaving `local` alone, when the store is empty.
    pub fn override_local<C: Clock>(&mut self, local: &mut Recorder<C>) -> SyncResult<bool> {
        let Some(blob) = self.fetch()? else {
            info!(key = %self.config.key, "remote is empty, keeping local state");
            return Ok(false);
        };
        let snapshot: Snapshot = serde_json::from_str(&blob).map_err(RecorderError::from)?;
        local.restore(snapshot);
        self.last_sync = Some(local.clock().now());
        info!(key = %self.config.key, "local overridden");
        Ok(true)
    }

    /// A sealed blob of `local`, for manual backups.
    pub fn export<C: Clock>(&self, local: &Recorder<C>) -> SyncResult<String> {
        Ok(self.envelope.seal(local.serialize())?)
    }

    /// Merge a sealed backup blob into `local`.
    pub fn import<C: Clock>(&self, local: &mut Recorder<C>, sealed: String) -> SyncResult<MergeOutcome> {
        let blob = self.envelope.open(sealed)?;
        let backup = Recorder::deserialize(&blob)?;
        Ok(local.merge(&backup))
    }

    fn fetch(&mut self) -> SyncResult<Option<String>> {
        let key = &self.config.key;
        let stored = match self.config.chunk_bytes {
            Some(max) => ChunkedStore::new(&mut self.store, max).get(key)?,
            None => self.store.get(key)?,
        };
        match stored {
            Some(blob) if !blob.trim().is_empty() => Ok(Some(self.envelope.open(blob)?)),
            _ => Ok(None),
        }
    }

    fn upload(&mut self, blob: String) -> SyncResult<()> {
        let sealed = self.envelope.seal(blob)?;
        let key = self.config.key.clone();

        let read_back = match self.config.chunk_bytes {
            Some(max) => {
                let mut chunked = ChunkedStore::new(&mut self.store, max);
                chunked.set(&key, sealed.clone())?;
                self.config.verify_upload.then(|| chunked.get(&key)).transpose()?
            }
            None => {
                self.store.set(&key, sealed.clone())?;
                self.config.verify_upload.then(|| self.store.get(&key)).transpose()?
            }
        };

        if let Some(read_back) = read_back {
            if read_back.as_deref() != Some(sealed.as_str()) {
                warn!(%key, "uploaded blob differs from what the store returned");
                return Err(SyncError::UploadMismatch { key });
            }
            info!(%key, bytes = sealed.len(), "upload verified");
        }
        Ok(())
    }
}
