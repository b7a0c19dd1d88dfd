//! Error types for configuration lookup.

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No record exists under the expected name.
    #[error("missing configuration: {key}")]
    Missing { key: String },

    /// A record exists but does not have the expected shape.
    #[error("invalid configuration {key}: {reason}")]
    Invalid { key: String, reason: String },

    /// The backing store failed.
    #[error("configuration store error: {0}")]
    Store(String),

    /// IO error reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConfigError {
    /// Returns true if this error means a record was not found.
    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::Missing { .. })
    }
}

impl From<rusqlite::Error> for ConfigError {
    fn from(e: rusqlite::Error) -> Self {
        ConfigError::Store(e.to_string())
    }
}
