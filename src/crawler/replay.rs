//! Error-queue replay
//!
//! Both passes drain their input queue front to back. Link replay re-harvests
//! each failed profile into the checkpoint it was meant for; image replay
//! re-acquires photos under the ids their profiles already carry.

use crate::config::{Config, OutputConfig};
use crate::crawler::harvest::{HarvestOutcome, Harvester};
use crate::model::{ImageError, LinkError};
use crate::render::Renderer;
use crate::storage::{
    ensure_checkpoint_parent, read_checkpoint_or_default, write_checkpoint, ErrorQueue,
};
use crate::HarvestError;
use std::path::{Component, Path, PathBuf};

/// Counts from one replay pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Entries taken off the input queue
    pub attempted: usize,
    pub repaired: usize,
    /// Entries that failed again and were queued for a later pass
    pub requeued: usize,
    /// Link entries whose profile was already in its checkpoint
    pub skipped: usize,
}

/// Default failure queue for an image replay: `<stem>-retry.json` beside `read`
///
/// ```
/// use doctor_harvest::crawler::retry_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     retry_path(Path::new("out/imageError.json")),
///     PathBuf::from("out/imageError-retry.json")
/// );
/// ```
pub fn retry_path(read: &Path) -> PathBuf {
    let stem = read
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "imageError".to_string());
    read.with_file_name(format!("{}-retry.json", stem))
}

/// Absolute, lexically normalized form of `path`
///
/// When the parent directory exists it is canonicalized as well, so symlinked
/// spellings of the same directory compare equal.
fn normalized(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }

    let parent = out.parent().and_then(|dir| dir.canonicalize().ok());
    match (parent, out.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => out,
    }
}

/// Replays the link and image error queues
pub struct Replayer<'r, R: Renderer + ?Sized> {
    renderer: &'r R,
    output: OutputConfig,
    harvester: Harvester,
}

impl<'r, R: Renderer + ?Sized> Replayer<'r, R> {
    pub fn new(renderer: &'r R, config: &Config) -> Self {
        Self {
            renderer,
            output: config.output.clone(),
            harvester: Harvester::from_config(config),
        }
    }

    /// Re-harvests every entry in the link-error queue
    ///
    /// A profile is appended to its checkpoint unless the checkpoint already
    /// holds that link, in which case the entry is consumed without a render.
    /// Entries that fail again go back on the queue, which is rewritten once
    /// at the end. An empty queue writes nothing.
    pub async fn replay_links(&self) -> Result<ReplayReport, HarvestError> {
        let path = &self.output.link_errors_path;
        let mut queue: ErrorQueue<LinkError> = ErrorQueue::load(path)?;
        let mut report = ReplayReport::default();

        if queue.is_empty() {
            tracing::info!("No link errors to replay in {}", path.display());
            return Ok(report);
        }

        tracing::info!("Replaying {} link errors", queue.len());
        let mut remaining = ErrorQueue::empty(path);

        while let Some(entry) = queue.pop() {
            report.attempted += 1;
            let checkpoint = entry.checkpoint_path();
            let mut doc = read_checkpoint_or_default(&checkpoint)?;

            if doc.contains_link(&entry.link) {
                tracing::info!("{} is already in {}", entry.link, checkpoint.display());
                report.skipped += 1;
                continue;
            }

            let outcome = self
                .harvester
                .harvest(
                    self.renderer,
                    &entry.link,
                    &entry.department_id,
                    &self.output.image_errors_path,
                )
                .await?;

            match outcome {
                HarvestOutcome::Harvested { profile, .. } => {
                    doc.doctor.push(profile);
                    ensure_checkpoint_parent(&checkpoint)?;
                    write_checkpoint(&checkpoint, &doc)?;
                    tracing::info!("Repaired {} into {}", entry.link, checkpoint.display());
                    report.repaired += 1;
                }
                HarvestOutcome::Failed { .. } => {
                    remaining.push(entry);
                    report.requeued += 1;
                }
            }
        }

        remaining.flush()?;
        tracing::info!(
            "Link replay: {} repaired, {} already present, {} still failing",
            report.repaired,
            report.skipped,
            report.requeued
        );

        Ok(report)
    }

    /// Re-acquires the photo of every entry in the image-error queue at `read`
    ///
    /// Further failures are appended to `write` (default [`retry_path`]). The
    /// input queue is emptied after the pass; a missing input file is a no-op.
    pub async fn replay_images(
        &self,
        read: &Path,
        write: Option<&Path>,
    ) -> Result<ReplayReport, HarvestError> {
        let write = write.map_or_else(|| retry_path(read), Path::to_path_buf);
        if normalized(&write) == normalized(read) {
            return Err(HarvestError::InvalidArgument(format!(
                "image replay cannot write failures back to its input queue {}",
                read.display()
            )));
        }

        let mut report = ReplayReport::default();
        if !read.exists() {
            tracing::info!("{} not found, nothing to replay", read.display());
            return Ok(report);
        }

        let mut queue: ErrorQueue<ImageError> = ErrorQueue::load(read)?;
        if queue.is_empty() {
            tracing::info!("No image errors to replay in {}", read.display());
            return Ok(report);
        }

        tracing::info!("Replaying {} image errors", queue.len());
        while let Some(entry) = queue.pop() {
            report.attempted += 1;
            let outcome = self
                .harvester
                .refetch_image(self.renderer, &entry.link, &entry.image_id, &write)
                .await?;

            if outcome.is_saved() {
                report.repaired += 1;
            } else {
                report.requeued += 1;
            }
        }

        queue.flush()?;
        tracing::info!(
            "Image replay: {} saved, {} queued to {}",
            report.repaired,
            report.requeued,
            write.display()
        );

        Ok(report)
    }
}
