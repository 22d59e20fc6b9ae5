//! Profile field extraction
//!
//! The fixed fields of a profile page are read through a declarative
//! [`FieldSpec`]. The chamber paragraph is different: address, visiting hours
//! and appointment number are run together in one block of text and have to
//! be cut apart at marker substrings.

use crate::config::SelectorConfig;
use crate::model::{Chamber, ProfileFields};
use crate::render::{Document, FieldSpec, Locator, Renderer};

const ADDRESS_MARKER: &str = "Address:";
const VISITING_MARKER: &str = "Visiting Hour:";
const APPOINTMENT_MARKER: &str = "Appointment:";
const CALL_TO_ACTION: &str = "Call Now";

const FIELD_NAME: &str = "name";
const FIELD_DEGREE: &str = "degree";
const FIELD_SPECIALTY: &str = "specialty";
const FIELD_WORKPLACE: &str = "workplace";
const FIELD_INFO: &str = "info";
const FIELD_HOSPITAL: &str = "hospital";
const FIELD_CHAMBER: &str = "chamber";

/// The three segments of a chamber text block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChamberText {
    pub address: String,
    pub visiting_time: String,
    pub appointment_number: String,
}

/// Splits a chamber paragraph at its first `Address:`, `Visiting Hour:` and
/// `Appointment:` markers
///
/// Positions follow `indexOf`/`slice` rules: a missing marker sits at -1, a
/// negative slice bound counts back from the end, and a slice whose end falls
/// before its start is empty. A block missing a marker therefore yields odd
/// but well-defined segments rather than an error.
///
/// # Example
///
/// ```
/// use doctor_harvest::crawler::split_chamber_text;
///
/// let text = "Address: 12 Green Rd Visiting Hour: 5pm-9pm Appointment: 01700-000000 Call Now";
/// let chamber = split_chamber_text(text);
/// assert_eq!(chamber.address, "12 Green Rd");
/// assert_eq!(chamber.visiting_time, "5pm-9pm");
/// assert_eq!(chamber.appointment_number, "01700-000000");
/// ```
pub fn split_chamber_text(text: &str) -> ChamberText {
    let chars: Vec<char> = text.trim().chars().collect();

    let address_at = index_of(&chars, ADDRESS_MARKER);
    let visiting_at = index_of(&chars, VISITING_MARKER);
    let appointment_at = index_of(&chars, APPOINTMENT_MARKER);

    let address = slice(&chars, address_at, Some(visiting_at)).replacen(ADDRESS_MARKER, "", 1);
    let visiting_time =
        slice(&chars, visiting_at, Some(appointment_at)).replacen(VISITING_MARKER, "", 1);
    let appointment_number = slice(&chars, appointment_at, None)
        .replacen(APPOINTMENT_MARKER, "", 1)
        .replacen(CALL_TO_ACTION, "", 1);

    ChamberText {
        address: address.trim().to_string(),
        visiting_time: visiting_time.trim().to_string(),
        appointment_number: appointment_number.trim().to_string(),
    }
}

/// Character index of the first occurrence of `needle`, or -1
fn index_of(haystack: &[char], needle: &str) -> isize {
    let needle: Vec<char> = needle.chars().collect();
    if needle.len() > haystack.len() {
        return -1;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle.as_slice())
        .map_or(-1, |i| i as isize)
}

fn slice(chars: &[char], start: isize, end: Option<isize>) -> String {
    let len = chars.len() as isize;
    let clamp = |i: isize| -> usize {
        if i < 0 {
            (len + i).max(0) as usize
        } else {
            i.min(len) as usize
        }
    };

    let from = clamp(start);
    let to = end.map_or(chars.len(), clamp);
    if to <= from {
        return String::new();
    }
    chars[from..to].iter().collect()
}

/// Reads the structured fields of a rendered profile page
#[derive(Debug, Clone)]
pub struct ProfileExtractor {
    spec: FieldSpec,
}

impl ProfileExtractor {
    /// Builds the field spec from the configured selectors
    pub fn new(selectors: &SelectorConfig) -> Self {
        let spec = FieldSpec::new()
            .field(FIELD_NAME, Locator::text(&selectors.name))
            .field(FIELD_DEGREE, Locator::text(&selectors.degree))
            .field(FIELD_SPECIALTY, Locator::text(&selectors.specialty))
            .field(FIELD_WORKPLACE, Locator::text(&selectors.workplace))
            .field(
                FIELD_INFO,
                Locator::nth_text(&selectors.paragraphs, selectors.info_index),
            )
            .field(FIELD_HOSPITAL, Locator::text(&selectors.hospital))
            .field(FIELD_CHAMBER, Locator::text(&selectors.paragraphs));
        Self { spec }
    }

    pub fn field_spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Extracts profile fields; anything not found comes back empty
    pub fn extract<R>(&self, renderer: &R, document: &Document) -> ProfileFields
    where
        R: Renderer + ?Sized,
    {
        let mut record = renderer.extract_fields(document, &self.spec);
        let chamber_text = split_chamber_text(record.get(FIELD_CHAMBER));

        ProfileFields {
            name: record.take(FIELD_NAME),
            degree: record.take(FIELD_DEGREE),
            specialty: record.take(FIELD_SPECIALTY),
            workplace: record.take(FIELD_WORKPLACE),
            info: record.take(FIELD_INFO),
            chamber: Chamber {
                hospital: record.take(FIELD_HOSPITAL),
                address: chamber_text.address,
                visiting_time: chamber_text.visiting_time,
                appointment_number: chamber_text.appointment_number,
            },
        }
    }
}
