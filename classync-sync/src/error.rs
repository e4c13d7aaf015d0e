//! Error types for classync-sync.

use std::path::PathBuf;

use thiserror::Error;

use classync_core::{CatalogError, DiffStatus};

use crate::pipeline::Resolution;

/// All errors that can arise from reading, writing, locking and resolving.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An expected id or structural anchor is missing from the shared file.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lock sentinel already exists.
    #[error("already locked by {holder} since {time}")]
    AlreadyLocked { holder: String, time: String },

    /// The parser could not locate the expected tags for one unit.
    #[error("malformed {unit}: {reason}")]
    Malformed { unit: String, reason: String },

    /// A writer-bound operation was attempted without holding the lock.
    #[error("lock on {path} is not held by this session")]
    NotLockHolder { path: PathBuf },

    /// The resolution does not apply to an entry with this status.
    #[error("cannot apply {resolution} to a {status} entry")]
    InvalidResolution {
        status: DiffStatus,
        resolution: Resolution,
    },

    /// An error from the project-side catalog.
    #[error("project catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::NotFound`].
pub(crate) fn not_found(what: impl Into<String>) -> SyncError {
    SyncError::NotFound { what: what.into() }
}
