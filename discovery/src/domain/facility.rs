//! Facility data model.
//!
//! Purpose: define the uniform entity the normalizer produces from
//! heterogeneous upstream tag dictionaries. Values are immutable once built;
//! each search constructs and discards its own list.

use std::fmt;
use std::str::FromStr;

use geodist::Coordinates;
use serde::Serialize;

/// Closed enumeration of facility kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityKind {
    /// Full hospital, assumed to offer emergency care.
    Hospital,
    /// Outpatient clinic.
    Clinic,
    /// Dispensing pharmacy.
    Pharmacy,
    /// General-practice surgery (tagged `doctors`/`doctor` upstream).
    GeneralPractice,
}

impl fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hospital => "hospital",
            Self::Clinic => "clinic",
            Self::Pharmacy => "pharmacy",
            Self::GeneralPractice => "general-practice",
        };
        f.write_str(label)
    }
}

/// Parse error returned by [`FacilityKind::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown facility kind {input:?}; expected hospital, clinic, pharmacy, or general-practice")]
pub struct FacilityKindParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for FacilityKind {
    type Err = FacilityKindParseError;

    /// Accepts the canonical kind names plus the upstream `doctor`/`doctors`
    /// spellings for general practice.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "hospital" => Ok(Self::Hospital),
            "clinic" => Ok(Self::Clinic),
            "pharmacy" => Ok(Self::Pharmacy),
            "doctor" | "doctors" | "general-practice" | "general_practice" => {
                Ok(Self::GeneralPractice)
            }
            _ => Err(FacilityKindParseError {
                input: input.to_owned(),
            }),
        }
    }
}

/// Composite identity of a facility: upstream element kind plus numeric id.
///
/// Synthetic fallback facilities use the reserved element type `synthetic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FacilityId {
    /// Upstream element kind (`node`, `way`, or `synthetic`).
    pub element_type: String,
    /// Numeric element identifier within the element kind.
    pub element_id: i64,
}

impl FacilityId {
    /// Build an identity from its parts.
    pub fn new(element_type: impl Into<String>, element_id: i64) -> Self {
        Self {
            element_type: element_type.into(),
            element_id,
        }
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.element_type, self.element_id)
    }
}

/// A healthcare facility normalized from one upstream record.
///
/// ## Invariants
/// - `name` is non-empty; unnamed upstream records never become facilities.
/// - `distance_km` is non-negative and consistent with the Haversine
///   distance from the query origin to `position`, rounded to two decimals.
/// - `specialties` and `amenities` contain no duplicate entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    /// Composite identity of the source record.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Classified facility kind.
    pub kind: FacilityKind,
    /// Deduplicated specialty labels.
    pub specialties: Vec<String>,
    /// Geographic position.
    pub position: Coordinates,
    /// Distance from the query origin in kilometres, rounded to two decimals.
    pub distance_km: f64,
    /// Free-text address assembled from structured parts.
    pub address: String,
    /// Contact phone number, when tagged.
    pub phone: Option<String>,
    /// Website URL, when tagged.
    pub website: Option<String>,
    /// Contact email, when tagged.
    pub email: Option<String>,
    /// Opening-hours text, when tagged.
    pub opening_hours: Option<String>,
    /// Whether the facility advertises emergency capability.
    pub emergency: bool,
    /// Bed capacity, when tagged with a parsable count.
    pub bed_capacity: Option<u32>,
    /// Deduplicated amenity labels.
    pub amenities: Vec<String>,
    /// Whether the facility is tagged wheelchair accessible.
    pub wheelchair_accessible: bool,
}
