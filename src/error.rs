//! Error types for kfzf
//!
//! All modules use `KfzfResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kfzf operations
pub type KfzfResult<T> = Result<T, KfzfError>;

/// All errors that can occur in kfzf
#[derive(Error, Debug)]
pub enum KfzfError {
    // Store setup errors
    #[error("Destination directory does not exist: {0}")]
    DestDirMissing(PathBuf),

    #[error("Destination path is not a directory: {0}")]
    DestDirNotADirectory(PathBuf),

    // Ingestion errors
    #[error("Resource has no name (namespace: {namespace:?})")]
    InvalidIdentity { namespace: Option<String> },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Malformed watch event on line {line}: {reason}")]
    EventParse { line: usize, reason: String },

    // Snapshot errors
    #[error("No dump found for {resource} at {path}")]
    DumpFileNotFound { resource: String, path: PathBuf },

    #[error("Snapshot codec error for {path}: {reason}")]
    Codec { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl KfzfError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a codec error for a snapshot file
    pub fn codec(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Codec {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if error is retryable
    ///
    /// Storage and encoding failures during a dump are expected to heal on a
    /// later tick; setup and identity errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Codec { .. } | Self::Json(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DestDirMissing(_) => Some("Run `kfzf ingest` once to create the cache directory"),
            Self::DumpFileNotFound { .. } => {
                Some("Start `kfzf ingest` for this resource type and wait for the first dump")
            }
            Self::UnknownResourceType(_) => {
                Some("Known types: pods, services, configmaps, namespaces, nodes, deployments, statefulsets, apiresources")
            }
            Self::ConfigInvalid { .. } => Some("Run: kfzf config init --force"),
            _ => None,
        }
    }
}
