//! Output module for post-processing harvested data
//!
//! This module handles:
//! - Aggregating checkpoints into one dataset file
//! - Combining aggregated files
//! - Duplicate detection and in-place record transforms
//! - Dataset statistics

mod dataset;
mod duplicates;
pub mod stats;

pub use dataset::{
    aggregate, combine, count_total_profiles, default_aggregate_path, default_combined_path,
    modify_all, strip_call_now, MergeReport, Transform,
};
pub use duplicates::{check_duplicates, DuplicateReport};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
