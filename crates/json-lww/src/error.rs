use thiserror::Error;

use json_lww_path::Path;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    /// A write or delete had to pass through a node that cannot hold the
    /// next step (a primitive, or a container of the other kind).
    #[error("invalid path operation at `{path}`: {reason}")]
    InvalidPathOperation { path: Path, reason: &'static str },
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl RecorderError {
    pub(crate) fn through_primitive(path: &Path) -> Self {
        RecorderError::InvalidPathOperation {
            path: path.clone(),
            reason: "path traverses a primitive value",
        }
    }

    pub(crate) fn kind_mismatch(path: &Path) -> Self {
        RecorderError::InvalidPathOperation {
            path: path.clone(),
            reason: "step does not match container kind",
        }
    }
}

impl From<serde_json::Error> for RecorderError {
    fn from(err: serde_json::Error) -> Self {
        RecorderError::MalformedInput(err.to_string())
    }
}

pub type RecorderResult<T> = Result<T, RecorderError>;
