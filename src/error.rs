// ⚠️ Error Types - Registry and configuration failures
// Registry errors never escape the pipeline; config errors stop the run before any request

use thiserror::Error;

/// Failures talking to the filing registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Network or HTTP client failure
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Directory, submissions or index response did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Document request answered with a non-success status
    #[error("retrieval failed for {url}: HTTP {status}")]
    Retrieval { url: String, status: u16 },
}

impl RegistryError {
    pub fn transport(url: &str, err: impl std::fmt::Display) -> Self {
        RegistryError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Parse(err.to_string())
    }
}

/// Unusable configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
