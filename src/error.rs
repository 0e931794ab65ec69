//! Error types for filerecstore
//!
//! Every failure surfaced to a caller is one of three kinds. Filesystem
//! errors are translated into one of them where they are detected.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type alias using RecordStoreError
pub type Result<T> = std::result::Result<T, RecordStoreError>;

/// Unified error type for record store operations
#[derive(Debug, Error)]
pub enum RecordStoreError {
    // -------------------------------------------------------------------------
    // Presence Errors
    // -------------------------------------------------------------------------
    /// The operation required absence and found the object present
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    /// The operation required presence and found the object absent,
    /// or the sequence cursor is exhausted
    #[error("Object does not exist: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// The underlying storage system failed
    #[error("Strategy error: {0}")]
    Strategy(String),
}

/// The kind of a [`RecordStoreError`], without its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Strategy,
}

impl RecordStoreError {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordStoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            RecordStoreError::NotFound(_) => ErrorKind::NotFound,
            RecordStoreError::Strategy(_) => ErrorKind::Strategy,
        }
    }

    /// Diagnostic message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            RecordStoreError::AlreadyExists(msg)
            | RecordStoreError::NotFound(msg)
            | RecordStoreError::Strategy(msg) => msg,
        }
    }

    /// Wrap an I/O failure on `path` as a strategy error
    pub(crate) fn io(context: &str, path: &Path, err: io::Error) -> Self {
        RecordStoreError::Strategy(format!("{} {}: {}", context, path.display(), err))
    }
}
