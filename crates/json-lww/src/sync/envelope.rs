//! Transformation applied to blobs on their way to and from a store.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("envelope error: {0}")]
pub struct EnvelopeError(pub String);

/// Seals blobs before upload and opens them after download.
///
/// `open(seal(x))` must return `x`. Encryption lives behind this trait;
/// the sync flow never looks inside a sealed blob.
pub trait Envelope {
    fn seal(&self, blob: String) -> Result<String, EnvelopeError>;
    fn open(&self, blob: String) -> Result<String, EnvelopeError>;
}

/// Passes blobs through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Envelope for Plain {
    fn seal(&self, blob: String) -> Result<String, EnvelopeError> {
        Ok(blob)
    }

    fn open(&self, blob: String) -> Result<String, EnvelopeError> {
        Ok(blob)
    }
}

impl<E: Envelope + ?Sized> Envelope for &E {
    fn seal(&self, blob: String) -> Result<String, EnvelopeError> {
        (**self).seal(blob)
    }

    fn open(&self, blob: String) -> Result<String, EnvelopeError> {
        (**self).open(blob)
    }
}
