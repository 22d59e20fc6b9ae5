use serde::{Deserialize, Serialize};

/// Chamber (practice location) details of a doctor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chamber {
    pub hospital: String,
    pub address: String,
    pub visiting_time: String,
    pub appointment_number: String,
}

/// Fields read from a rendered profile page
///
/// This is everything in a [`DoctorProfile`] except the identifiers and the
/// link, which belong to the crawl rather than to the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub degree: String,
    pub specialty: String,
    pub workplace: String,
    pub info: String,
    pub chamber: Chamber,
}

/// A harvested doctor profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: String,
    pub department_id: String,
    pub link: String,
    pub image_id: String,
    pub name: String,
    pub degree: String,
    pub specialty: String,
    pub workplace: String,
    pub info: String,
    pub chamber: Chamber,
}

impl DoctorProfile {
    /// Assembles a profile from extracted fields and crawl identifiers
    pub fn from_fields(
        id: String,
        department_id: String,
        link: String,
        image_id: String,
        fields: ProfileFields,
    ) -> Self {
        Self {
            id,
            department_id,
            link,
            image_id,
            name: fields.name,
            degree: fields.degree,
            specialty: fields.specialty,
            workplace: fields.workplace,
            info: fields.info,
            chamber: fields.chamber,
        }
    }
}

/// Contents of a checkpoint or aggregated result file: `{"doctor": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointDocument {
    #[serde(default)]
    pub doctor: Vec<DoctorProfile>,
}

impl CheckpointDocument {
    pub fn new(doctor: Vec<DoctorProfile>) -> Self {
        Self { doctor }
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.doctor.iter().any(|d| d.link == link)
    }
}
