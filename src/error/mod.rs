//! # Error Module
//!
//! Error types for the duplicate scanner.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths and what went wrong
//! - **Cancellation is not a failure** - the pipeline turns it into a normal,
//!   empty result before it reaches the caller

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DupeFinderError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Digest error: {0}")]
    Digest(#[from] DigestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that occur while enumerating items or running a scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors raised by an item when one of its content digests is requested
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Failed to read {path} for hashing: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No digest available for {path}")]
    Unavailable { path: PathBuf },
}

impl DupeFinderError {
    /// Whether this error only signals a cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DupeFinderError::Scan(ScanError::Cancelled))
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DupeFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/music/albums"),
        };
        let message = error.to_string();
        assert!(message.contains("/music/albums"));
    }

    #[test]
    fn digest_error_includes_path_and_cause() {
        let error = DigestError::Read {
            path: PathBuf::from("/music/track.mp3"),
            source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated"),
        };
        let message = error.to_string();
        assert!(message.contains("/music/track.mp3"));
        assert!(message.contains("truncated"));
    }

    #[test]
    fn cancellation_is_recognised() {
        let error: DupeFinderError = ScanError::Cancelled.into();
        assert!(error.is_cancelled());

        let error: DupeFinderError = DigestError::Unavailable {
            path: PathBuf::from("/a"),
        }
        .into();
        assert!(!error.is_cancelled());
    }
}
