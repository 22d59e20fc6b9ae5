//! Durable error queues
//!
//! Each queue is one JSON document `{"errors": [...]}`. A queue is loaded into
//! memory, mutated, and flushed back at well-defined points. Nothing locks the
//! file between `load` and `flush`: entries appended on disk in between are
//! overwritten by the flush.

use crate::storage::json::{read_json, write_json};
use crate::storage::traits::StorageResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "E: DeserializeOwned"))]
struct QueueDocument<E> {
    #[serde(default = "Vec::new")]
    errors: Vec<E>,
}

/// An owned, in-memory copy of an error queue file
#[derive(Debug, Clone)]
pub struct ErrorQueue<E> {
    path: PathBuf,
    entries: VecDeque<E>,
}

impl<E> ErrorQueue<E>
where
    E: Serialize + DeserializeOwned,
{
    /// Loads the queue at `path`; a missing file is an empty queue
    pub fn load(path: &Path) -> StorageResult<Self> {
        let entries = if path.exists() {
            let doc: QueueDocument<E> = read_json(path)?;
            doc.errors.into()
        } else {
            VecDeque::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Creates an empty in-memory queue bound to `path` without touching disk
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: VecDeque::new(),
        }
    }

    /// Writes the current entries back to the queue file
    pub fn flush(&self) -> StorageResult<()> {
        let doc = QueueDocument {
            errors: self.entries.iter().collect::<Vec<_>>(),
        };
        write_json(&self.path, &doc)
    }

    /// Creates the queue file with an empty list if it does not exist yet
    pub fn ensure_exists(path: &Path) -> StorageResult<()> {
        if path.exists() {
            return Ok(());
        }
        tracing::info!("{} not found, creating an empty queue", path.display());
        Self::empty(path).flush()
    }

    /// Appends one entry to the queue file with a read-modify-write
    pub fn append_entry(path: &Path, entry: E) -> StorageResult<()> {
        Self::ensure_exists(path)?;
        let mut queue = Self::load(path)?;
        queue.push(entry);
        queue.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn push(&mut self, entry: E) {
        self.entries.push_back(entry);
    }

    /// Removes the oldest entry
    pub fn pop(&mut self) -> Option<E> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.iter()
    }
}
