use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SYNC_KEY: &str = "json-lww";

pub const ENV_SYNC_KEY: &str = "JSON_LWW_SYNC_KEY";
pub const ENV_VERIFY_UPLOAD: &str = "JSON_LWW_VERIFY_UPLOAD";
pub const ENV_CHUNK_BYTES: &str = "JSON_LWW_CHUNK_BYTES";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value {value:?} for {name}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Where and how a recorder is synchronised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Store key the blob lives under.
    pub key: String,
    /// Read the blob back after every upload and compare.
    pub verify_upload: bool,
    /// Split blobs into pieces of at most this many bytes.
    pub chunk_bytes: Option<usize>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_SYNC_KEY.to_string(),
            verify_upload: true,
            chunk_bytes: None,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from a variable lookup; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(key) = lookup(ENV_SYNC_KEY).filter(|k| !k.is_empty()) {
            config.key = key;
        }
        if let Some(raw) = lookup(ENV_VERIFY_UPLOAD) {
            config.verify_upload = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError {
                        name: ENV_VERIFY_UPLOAD,
                        value: raw,
                    })
                }
            };
        }
        if let Some(raw) = lookup(ENV_CHUNK_BYTES) {
            let bytes = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError {
                    name: ENV_CHUNK_BYTES,
                    value: raw.clone(),
                })?;
            config.chunk_bytes = Some(bytes);
        }
        Ok(config)
    }
}
