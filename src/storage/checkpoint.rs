//! Per-department checkpoint files
//!
//! Layout: `<root>/<district>/<ordinal>-<sanitized-name>-doctors.json`.

use crate::model::CheckpointDocument;
use crate::storage::json::{read_json, read_json_or_default, write_json};
use crate::storage::traits::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Replaces every `/` and space in a department name with `-`
pub fn sanitize_department_name(name: &str) -> String {
    name.replace(['/', ' '], "-")
}

/// Builds the checkpoint file id (the path without `.json`) for a department
///
/// # Example
///
/// ```
/// use doctor_harvest::storage::checkpoint_file_id;
/// use std::path::Path;
///
/// let id = checkpoint_file_id(Path::new("doc-list"), "dhaka", 3, "Eye Specialist");
/// assert_eq!(id, "doc-list/dhaka/3-Eye-Specialist-doctors");
/// ```
pub fn checkpoint_file_id(root: &Path, district: &str, ordinal: usize, name: &str) -> String {
    let file_name = format!("{}-{}-doctors", ordinal, sanitize_department_name(name));
    root.join(district)
        .join(file_name)
        .to_string_lossy()
        .into_owned()
}

/// Resolves a checkpoint file id to its file path
pub fn checkpoint_path(file_id: &str) -> PathBuf {
    PathBuf::from(format!("{}.json", file_id))
}

/// Creates `<root>/<district>` if it does not exist yet
pub fn ensure_district_dir(root: &Path, district: &str) -> StorageResult<PathBuf> {
    let dir = root.join(district);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        tracing::debug!("Created checkpoint directory {}", dir.display());
    }
    Ok(dir)
}

/// Creates the directory a checkpoint file lives in, if needed
pub fn ensure_checkpoint_parent(path: &Path) -> StorageResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))
        }
        _ => Ok(()),
    }
}

pub fn read_checkpoint(path: &Path) -> StorageResult<CheckpointDocument> {
    read_json(path)
}

/// Reads a checkpoint, treating a missing file as an empty one
pub fn read_checkpoint_or_default(path: &Path) -> StorageResult<CheckpointDocument> {
    read_json_or_default(path)
}

pub fn write_checkpoint(path: &Path, doc: &CheckpointDocument) -> StorageResult<()> {
    write_json(path, doc)
}

/// Lists every checkpoint file under `root`, districts and files sorted by name
///
/// Only `*.json` files one level below a district directory are returned.
pub fn list_checkpoint_files(root: &Path) -> StorageResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(StorageError::NotADirectory(root.to_path_buf()));
    }

    let mut districts = sorted_entries(root)?;
    districts.retain(|p| p.is_dir());

    let mut files = Vec::new();
    for district in districts {
        let mut district_files = sorted_entries(&district)?;
        district_files.retain(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"));
        files.extend(district_files);
    }

    Ok(files)
}

fn sorted_entries(dir: &Path) -> StorageResult<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| StorageError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::io(dir, e))?;
    entries.sort();
    Ok(entries)
}
