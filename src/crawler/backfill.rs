//! Bulk photo backfill for already-harvested profiles

use crate::crawler::harvest::Harvester;
use crate::crawler::limiter::TaskLimiter;
use crate::model::DoctorProfile;
use crate::render::Renderer;
use crate::storage::StorageError;
use futures::future::join_all;
use std::path::Path;

/// Counts from one backfill run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub attempted: usize,
    pub saved: usize,
    pub queued: usize,
    /// Profiles whose photo was already stored
    pub skipped: usize,
}

/// Re-renders each profile and re-acquires its photo under its existing `imageId`
///
/// Runs under `limiter`; failures are appended to `errors`. Unless
/// `overwrite` is set, profiles whose photo is already in the blob store are
/// left alone.
pub async fn backfill_images<R>(
    renderer: &R,
    harvester: &Harvester,
    limiter: &TaskLimiter,
    profiles: &[DoctorProfile],
    errors: &Path,
    overwrite: bool,
) -> Result<BackfillReport, StorageError>
where
    R: Renderer + ?Sized,
{
    let mut report = BackfillReport::default();
    let mut pending = Vec::with_capacity(profiles.len());

    for profile in profiles {
        if !overwrite && harvester.images().blobs().contains(&profile.image_id)? {
            report.skipped += 1;
        } else {
            pending.push(profile);
        }
    }

    tracing::info!(
        "Backfilling {} photos ({} already stored)",
        pending.len(),
        report.skipped
    );

    let tasks = pending.iter().map(move |profile| {
        limiter.submit(move || {
            harvester.refetch_image(renderer, &profile.link, &profile.image_id, errors)
        })
    });

    for outcome in join_all(tasks).await {
        report.attempted += 1;
        if outcome?.is_saved() {
            report.saved += 1;
        } else {
            report.queued += 1;
        }
    }

    tracing::info!(
        "Backfill: {} saved, {} queued to {}",
        report.saved,
        report.queued,
        errors.display()
    );

    Ok(report)
}
