//! Duplicate detection by profile link

use crate::model::DoctorProfile;
use std::collections::HashSet;

/// Profiles partitioned by link; the input is left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport<'a> {
    /// First occurrence of each link, in input order
    pub unique: Vec<&'a DoctorProfile>,
    /// Every later occurrence, in input order
    pub duplicates: Vec<&'a DoctorProfile>,
}

impl DuplicateReport<'_> {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

pub fn check_duplicates(profiles: &[DoctorProfile]) -> DuplicateReport<'_> {
    let mut seen = HashSet::new();
    let mut report = DuplicateReport::default();

    for profile in profiles {
        if seen.insert(profile.link.as_str()) {
            report.unique.push(profile);
        } else {
            report.duplicates.push(profile);
        }
    }

    report
}
