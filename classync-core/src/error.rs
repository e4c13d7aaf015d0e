//! Error types for classync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ExternalRef;

/// All errors that can arise from project catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with file path and serde_yaml line context.
    #[error("failed to parse project catalog at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The catalog file did not exist.
    #[error("project catalog not found at {path}")]
    NotFound { path: PathBuf },

    /// No system or item carries this reference.
    #[error("unknown project reference '{0}'")]
    UnknownRef(ExternalRef),

    /// Item ids must never be empty.
    #[error("item id must not be empty")]
    EmptyId,
}
