//! Error handling for lab-log

use std::path::PathBuf;

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogError {
    /// Unknown level name
    #[error("Invalid log level '{0}' (expected SILENT, ERROR, WARN, INFO, SUCCESS, DEBUG, TRACE or VERBOSE)")]
    InvalidLevel(String),

    /// Unknown file format name
    #[error("Invalid log format '{0}' (expected Structured, Simple or JSON)")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
        /// Underlying IO failure, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Create a configuration error without an underlying cause
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error for a log directory that cannot be used
    pub fn unwritable_directory(dir: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Config {
            message: format!("log directory '{}' is not writable", dir.into().display()),
            source: Some(source),
        }
    }

    /// Whether this error came from configuration input rather than the filesystem
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidLevel(_) | Self::InvalidFormat(_) | Self::Config { .. }
        )
    }
}
