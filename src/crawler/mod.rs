//! Crawler module for harvesting doctor profiles
//!
//! This module contains the core crawling logic, including:
//! - Bounded-concurrency task admission
//! - Profile field extraction and chamber segmentation
//! - Photo acquisition with soft failure
//! - Department and district orchestration
//! - Error-queue replay and bulk photo backfill

mod backfill;
mod coordinator;
mod harvest;
mod image;
mod limiter;
mod profile;
mod replay;

pub use backfill::{backfill_images, BackfillReport};
pub use coordinator::{known_links, CrawlReport, DepartmentReport, FailedDepartment, Orchestrator};
pub use harvest::{HarvestOutcome, Harvester};
pub use image::{extension_from_content_type, ImageAcquirer, ImageOutcome};
pub use limiter::TaskLimiter;
pub use profile::{split_chamber_text, ChamberText, ProfileExtractor};
pub use replay::{retry_path, ReplayReport, Replayer};
