//! Filesystem blob store for profile photos

use crate::storage::traits::{BlobStore, StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Stores blobs as `<dir>/<id>.<ext>`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn blob_path(&self, id: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, ext))
    }
}

impl BlobStore for FsBlobStore {
    fn save_blob(&self, id: &str, bytes: &[u8], ext: &str) -> StorageResult<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        }
        let path = self.blob_path(id, ext);
        std::fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;
        tracing::debug!("Saved image {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn contains(&self, id: &str) -> StorageResult<bool> {
        if !self.dir.exists() {
            return Ok(false);
        }
        let prefix = format!("{}.", id);
        for entry in std::fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
