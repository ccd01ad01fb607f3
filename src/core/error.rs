//! Error types for dist-archive

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dist-archive operations
#[derive(Error, Debug)]
pub enum DistArchiveError {
    /// Manifest errors
    #[error("Failed to evaluate ignore rules for {path}: {reason}")]
    InvalidRule { path: String, reason: String },

    #[error("Broken symlink at {path}. Target missing at {}.", .target.display())]
    BrokenSymlink { path: String, target: PathBuf },

    /// Path resolution errors
    #[error("Provided input path is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("Target directory does not exist: {}", .path.display())]
    TargetDirectoryNotFound { path: PathBuf },

    /// Archive errors
    #[error("Archive command `{command}` failed: {output}")]
    ArchiveCommandFailed { command: String, output: String },

    /// Configuration errors
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DistArchiveError {
    /// Create a new invalid rule error
    pub fn invalid_rule(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new broken symlink error
    pub fn broken_symlink(path: impl Into<String>, target: PathBuf) -> Self {
        Self::BrokenSymlink {
            path: path.into(),
            target,
        }
    }

    /// Create a new not-a-directory error
    pub fn not_a_directory(path: PathBuf) -> Self {
        Self::NotADirectory { path }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type alias for dist-archive operations
pub type Result<T> = std::result::Result<T, DistArchiveError>;
