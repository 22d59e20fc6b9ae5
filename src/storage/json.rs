//! Whole-document JSON file access
//!
//! Writes are a single overwrite of the target file. There is no temp-file
//! rename, so a crash mid-write can leave a truncated document behind.

use crate::storage::traits::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Reads and deserializes a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| StorageError::json(path, e))
}

/// Reads a JSON document, falling back to the default value if the file is absent
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> StorageResult<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    read_json(path)
}

/// Serializes a value as pretty-printed JSON and overwrites the file
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let content = serde_json::to_string_pretty(value).map_err(|e| StorageError::json(path, e))?;
    std::fs::write(path, content).map_err(|e| StorageError::io(path, e))
}
