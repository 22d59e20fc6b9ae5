//! Storage module for persisting crawl data
//!
//! This module handles all file-backed persistence for the crawler:
//! - Whole-document JSON reads and writes
//! - Per-department checkpoint files
//! - Durable link and image error queues
//! - Profile photo blobs
//! - The department catalog

mod blob;
mod checkpoint;
mod json;
mod queue;
mod traits;

pub use blob::FsBlobStore;
pub use checkpoint::{
    checkpoint_file_id, checkpoint_path, ensure_checkpoint_parent, ensure_district_dir,
    list_checkpoint_files, read_checkpoint, read_checkpoint_or_default, sanitize_department_name,
    write_checkpoint,
};
pub use json::{read_json, read_json_or_default, write_json};
pub use queue::ErrorQueue;
pub use traits::{BlobStore, StorageError, StorageResult};

use crate::model::{CatalogDocument, DepartmentCatalog};
use std::path::Path;

/// Loads the department catalog written by department discovery
pub fn load_catalog(path: &Path) -> StorageResult<DepartmentCatalog> {
    let doc: CatalogDocument = read_json(path)?;
    Ok(doc.department)
}

/// Writes the department catalog as `{"department": {...}}`
pub fn save_catalog(path: &Path, catalog: &DepartmentCatalog) -> StorageResult<()> {
    let doc = CatalogDocument {
        department: catalog.clone(),
    };
    write_json(path, &doc)
}
