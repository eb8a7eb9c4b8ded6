//! Error types for the composer system.
//!
//! All failures that cross a crate boundary are represented by the [`Error`] enum.
//! Parsing never produces an error: malformed frontmatter or an unmatched path are
//! ordinary outcomes. Only precondition violations and I/O land here.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all composer operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid file path (outside vault, empty, etc.)
    #[error("Invalid file path: {reason}")]
    InvalidPath { reason: String },

    /// Path traversal attempt detected
    #[error("Path traversal detected: {path}")]
    PathTraversalAttempt { path: PathBuf },

    /// A create or rename would land on an existing file or folder
    #[error("Target already exists: {path}")]
    PathConflict { path: String },

    /// A title that cannot produce a filename
    #[error("Invalid title: {reason}")]
    InvalidTitle { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create an invalid path error
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            reason: reason.into(),
        }
    }

    /// Create a path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Error::PathTraversalAttempt { path: path.into() }
    }

    /// Create a path conflict error naming the existing target
    pub fn path_conflict(path: impl Into<String>) -> Self {
        Error::PathConflict { path: path.into() }
    }

    /// Create an invalid title error
    pub fn invalid_title(reason: impl Into<String>) -> Self {
        Error::InvalidTitle {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
