//! Error types for range-sync
//!
//! Per-file read failures inside a source are not errors: they are logged and
//! the cluster is left out. Everything here aborts the operation that raised it.

use crate::config::ConfigError;
use range_client::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Output location exists but is not a directory (or does not exist)
    #[error("Destination is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Only yaml output is implemented
    #[error("Output type '{0}' is not supported (only yaml)")]
    UnsupportedFormat(String),

    /// A whole source could not be read
    #[error("Source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// Copy or rename failed while publishing a file
    #[error("Failed to publish {}: {source}", path.display())]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Range server query failed
    #[error("Range query failed: {0}")]
    Range(#[from] TransportError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Create a source error
    pub fn source_failed(source_name: impl Into<String>, message: impl ToString) -> Self {
        SyncError::Source {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create a publish error for `path`
    pub fn publish(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Publish {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
