use serde::{Deserialize, Serialize};

/// A profile link whose page could not be rendered or extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkError {
    pub link: String,
    pub district: String,
    /// Checkpoint file path without the `.json` extension
    pub file_id: String,
    pub department_id: String,
}

impl LinkError {
    /// Path of the checkpoint file this entry should be repaired into
    pub fn checkpoint_path(&self) -> std::path::PathBuf {
        crate::storage::checkpoint_path(&self.file_id)
    }
}

/// A harvested profile whose photo could not be acquired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageError {
    pub image_id: String,
    pub link: String,
}
