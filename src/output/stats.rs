//! Dataset statistics
//!
//! This module counts what a harvest has produced so far: profiles per
//! district, checkpoint files, and the sizes of both error queues.

use crate::config::OutputConfig;
use crate::model::{ImageError, LinkError};
use crate::storage::{list_checkpoint_files, read_checkpoint, ErrorQueue, StorageResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Harvest statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Number of checkpoint files on disk
    pub checkpoint_files: usize,

    /// Total profiles across every checkpoint
    pub total_profiles: usize,

    /// Profile counts keyed by district directory name
    pub profiles_by_district: BTreeMap<String, usize>,

    /// Entries waiting in the link-error queue
    pub link_errors: usize,

    /// Entries waiting in the image-error queue
    pub image_errors: usize,
}

/// Loads statistics from the configured output locations
///
/// A checkpoint root that does not exist yet counts as an empty dataset.
pub fn load_statistics(output: &OutputConfig) -> StorageResult<HarvestStatistics> {
    let mut stats = HarvestStatistics::default();

    if output.checkpoint_root.is_dir() {
        for file in list_checkpoint_files(&output.checkpoint_root)? {
            let count = read_checkpoint(&file)?.doctor.len();
            let district = district_of(&file);
            *stats.profiles_by_district.entry(district).or_default() += count;
            stats.total_profiles += count;
            stats.checkpoint_files += 1;
        }
    }

    stats.link_errors = ErrorQueue::<LinkError>::load(&output.link_errors_path)?.len();
    stats.image_errors = ErrorQueue::<ImageError>::load(&output.image_errors_path)?.len();

    Ok(stats)
}

fn district_of(file: &Path) -> String {
    file.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total profiles: {}", stats.total_profiles);
    println!("  Checkpoint files: {}", stats.checkpoint_files);
    println!();

    if !stats.profiles_by_district.is_empty() {
        println!("Profiles by District:");
        for (district, count) in &stats.profiles_by_district {
            let percentage = if stats.total_profiles > 0 {
                (*count as f64 / stats.total_profiles as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", district, count, percentage);
        }
        println!();
    }

    println!("Error Queues:");
    println!("  Link errors: {}", stats.link_errors);
    println!("  Image errors: {}", stats.image_errors);
}
