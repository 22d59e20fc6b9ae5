//! Storage traits and error types
//!
//! This module defines the trait interface for blob storage backends and the
//! error type shared by every file-backed store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for binary content stores
///
/// A blob is addressed by an identifier plus a file extension; writing the
/// same identifier twice overwrites the earlier payload.
pub trait BlobStore: Send + Sync {
    /// Persists `bytes` under `id` with the given extension
    fn save_blob(&self, id: &str, bytes: &[u8], ext: &str) -> StorageResult<()>;

    /// Returns true if a blob with this identifier exists under any extension
    fn contains(&self, id: &str) -> StorageResult<bool>;
}
