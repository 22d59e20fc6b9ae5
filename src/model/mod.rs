//! Data model shared by the crawler, the replayer and the post-processing
//! utilities
//!
//! Every type here round-trips through the JSON files the crawl leaves on
//! disk, so field names follow the on-disk camelCase layout.

mod catalog;
mod profile;
mod queue_entry;

pub use catalog::{DepartmentCatalog, DepartmentEntry};
pub(crate) use catalog::CatalogDocument;
pub use profile::{Chamber, CheckpointDocument, DoctorProfile, ProfileFields};
pub use queue_entry::{ImageError, LinkError};

use uuid::Uuid;

/// Generates a fresh random identifier
///
/// Identifiers are generated locally with no central allocator; collisions are
/// accepted as negligible.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
