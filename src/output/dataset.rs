//! Whole-dataset operations over checkpoint files
//!
//! Every operation here walks the checkpoint tree in sorted order (districts,
//! then files within a district) so results are reproducible between runs.

use crate::model::{CheckpointDocument, DoctorProfile};
use crate::storage::{list_checkpoint_files, read_checkpoint, write_checkpoint, StorageResult};
use std::path::{Path, PathBuf};

/// A per-record mapping applied by [`aggregate`] and [`modify_all`]
pub type Transform<'a> = &'a dyn Fn(DoctorProfile) -> DoctorProfile;

/// What an aggregate or combine run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Input files actually read
    pub files: usize,
    pub profiles: usize,
    pub path: PathBuf,
}

/// `doctors-<unix-millis>.json` in the working directory
pub fn default_aggregate_path() -> PathBuf {
    PathBuf::from(format!("doctors-{}.json", unix_millis()))
}

/// `combined-doctors-<unix-millis>.json` in the working directory
pub fn default_combined_path() -> PathBuf {
    PathBuf::from(format!("combined-doctors-{}.json", unix_millis()))
}

fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Concatenates every checkpoint under `root` into one `{doctor: [...]}` file
///
/// Records are kept in walk order and, without a transform, unmodified.
pub fn aggregate(
    root: &Path,
    transform: Option<Transform<'_>>,
    out: &Path,
) -> StorageResult<MergeReport> {
    let files = list_checkpoint_files(root)?;
    let mut doctors = Vec::new();

    for file in &files {
        let doc = read_checkpoint(file)?;
        tracing::debug!("{}: {} profiles", file.display(), doc.doctor.len());
        match transform {
            Some(transform) => doctors.extend(doc.doctor.into_iter().map(transform)),
            None => doctors.extend(doc.doctor),
        }
    }

    let report = MergeReport {
        files: files.len(),
        profiles: doctors.len(),
        path: out.to_path_buf(),
    };
    write_checkpoint(out, &CheckpointDocument::new(doctors))?;
    tracing::info!(
        "Aggregated {} profiles from {} files into {}",
        report.profiles,
        report.files,
        out.display()
    );

    Ok(report)
}

/// Merges aggregated files in the order given; missing files are skipped
pub fn combine(paths: &[PathBuf], out: &Path) -> StorageResult<MergeReport> {
    let mut doctors = Vec::new();
    let mut files = 0;

    for path in paths {
        if !path.exists() {
            tracing::warn!("{} not found, skipping", path.display());
            continue;
        }
        let doc = read_checkpoint(path)?;
        tracing::info!("{}: {} profiles", path.display(), doc.doctor.len());
        doctors.extend(doc.doctor);
        files += 1;
    }

    let report = MergeReport {
        files,
        profiles: doctors.len(),
        path: out.to_path_buf(),
    };
    write_checkpoint(out, &CheckpointDocument::new(doctors))?;
    tracing::info!(
        "Combined {} profiles into {}",
        report.profiles,
        out.display()
    );

    Ok(report)
}

/// Applies `transform` to every record of every checkpoint and rewrites each file
///
/// Returns the number of records rewritten.
pub fn modify_all(root: &Path, transform: Transform<'_>) -> StorageResult<usize> {
    let mut total = 0;

    for file in list_checkpoint_files(root)? {
        let doc = read_checkpoint(&file)?;
        total += doc.doctor.len();
        let doctor = doc.doctor.into_iter().map(transform).collect();
        write_checkpoint(&file, &CheckpointDocument::new(doctor))?;
    }

    tracing::info!("Rewrote {} profiles under {}", total, root.display());
    Ok(total)
}

/// Sum of profiles across every checkpoint under `root`
pub fn count_total_profiles(root: &Path) -> StorageResult<usize> {
    let mut total = 0;
    for file in list_checkpoint_files(root)? {
        total += read_checkpoint(&file)?.doctor.len();
    }
    Ok(total)
}

/// Removes a leftover "Call Now" from the appointment number
pub fn strip_call_now(mut profile: DoctorProfile) -> DoctorProfile {
    let cleaned = profile
        .chamber
        .appointment_number
        .replace("Call Now", "")
        .trim()
        .to_string();
    profile.chamber.appointment_number = cleaned;
    profile
}
