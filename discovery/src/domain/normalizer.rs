//! Normalization of raw mirror records into [`Facility`] values.
//!
//! Upstream tag dictionaries vary wildly in coverage: the same clinic can be
//! tagged under `amenity`, `healthcare`, both, or neither, and address and
//! specialty data is frequently partial. This module owns the precedence
//! rules and lookup tables that flatten that mess into the uniform model.

use geodist::{Coordinates, round_to_hundredths};

use super::facility::{Facility, FacilityId, FacilityKind};
use super::ports::RawFacilityRecord;

/// Placeholder emitted when a record carries no structured address parts.
pub const ADDRESS_UNAVAILABLE: &str = "Address not available";

/// Boolean specialty flags mapped to display labels.
///
/// A flag counts when either `<key>=yes` or `healthcare:speciality:<key>=yes`
/// is present.
const SPECIALTY_FLAGS: &[(&str, &str)] = &[
    ("cardiology", "Cardiology"),
    ("neurology", "Neurology"),
    ("endocrinology", "Endocrinology"),
    ("internal_medicine", "Internal Medicine"),
    ("family_medicine", "Family Medicine"),
    ("emergency", "Emergency Medicine"),
    ("surgery", "Surgery"),
    ("orthopedics", "Orthopedics"),
    ("pediatrics", "Pediatrics"),
    ("psychiatry", "Psychiatry"),
    ("dermatology", "Dermatology"),
    ("ophthalmology", "Ophthalmology"),
    ("dentistry", "Dentistry"),
];

/// Boolean amenity flags mapped to display labels.
const AMENITY_FLAGS: &[(&str, &str)] = &[
    ("parking", "Parking Available"),
    ("wheelchair", "Wheelchair Accessible"),
    ("wifi", "WiFi Available"),
    ("cafe", "Cafeteria"),
    ("atm", "ATM"),
    ("pharmacy", "Pharmacy"),
    ("laboratory", "Laboratory"),
    ("imaging", "Medical Imaging"),
    ("emergency", "24/7 Emergency"),
];

/// Default specialties for hospitals with no explicit specialty data.
const HOSPITAL_DEFAULT_SPECIALTIES: &[&str] = &["General Medicine", "Emergency Care"];

/// Normalize a batch of raw records into a distance-sorted facility list.
///
/// Records without a display name are discarded, as are records whose
/// coordinates cannot satisfy the distance invariant.
#[must_use]
pub fn normalize_records(
    origin: &Coordinates,
    records: Vec<RawFacilityRecord>,
) -> Vec<Facility> {
    let mut facilities: Vec<Facility> = records
        .into_iter()
        .filter_map(|record| normalize_record(origin, &record))
        .collect();
    // Stable sort: equidistant facilities keep their upstream order.
    facilities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    facilities
}

fn normalize_record(origin: &Coordinates, record: &RawFacilityRecord) -> Option<Facility> {
    let name = record.tag("name")?.trim();
    if name.is_empty() {
        return None;
    }
    let position = Coordinates::try_new(record.latitude, record.longitude).ok()?;

    let kind = classify_kind(record);
    let distance_km = round_to_hundredths(origin.distance_km(&position));

    Some(Facility {
        id: FacilityId::new(record.element_type.clone(), record.element_id),
        name: name.to_owned(),
        kind,
        specialties: extract_specialties(record, kind),
        position,
        distance_km,
        address: build_address(record),
        phone: record.tag("phone").map(str::to_owned),
        website: record.tag("website").map(str::to_owned),
        email: record.tag("email").map(str::to_owned),
        opening_hours: record.tag("opening_hours").map(str::to_owned),
        emergency: record.tag_is_yes("emergency") || record.tag_is_yes("emergency:healthcare"),
        bed_capacity: record
            .tag("bed:count")
            .and_then(|count| count.trim().parse().ok()),
        amenities: extract_amenities(record),
        wheelchair_accessible: record.tag_is_yes("wheelchair"),
    })
}

/// Classify the facility kind from its tags.
///
/// The precedence chain is fixed: hospital under either scheme, then clinic,
/// then pharmacy (amenity scheme only), then general practice, then the
/// clinic default for anything named but ambiguously tagged.
fn classify_kind(record: &RawFacilityRecord) -> FacilityKind {
    let amenity = record.tag("amenity");
    let healthcare = record.tag("healthcare");

    if amenity == Some("hospital") || healthcare == Some("hospital") {
        FacilityKind::Hospital
    } else if amenity == Some("clinic") || healthcare == Some("clinic") {
        FacilityKind::Clinic
    } else if amenity == Some("pharmacy") {
        FacilityKind::Pharmacy
    } else if amenity == Some("doctors") || healthcare == Some("doctor") {
        FacilityKind::GeneralPractice
    } else {
        FacilityKind::Clinic
    }
}

fn extract_specialties(record: &RawFacilityRecord, kind: FacilityKind) -> Vec<String> {
    let mut specialties = Vec::new();

    if let Some(raw) = record.tag("healthcare:speciality") {
        for item in raw.split(';') {
            let item = item.trim();
            if !item.is_empty() {
                push_unique(&mut specialties, item);
            }
        }
    }

    for (key, label) in SPECIALTY_FLAGS {
        let scoped = format!("healthcare:speciality:{key}");
        if record.tag_is_yes(key) || record.tag_is_yes(&scoped) {
            push_unique(&mut specialties, label);
        }
    }

    if specialties.is_empty() && kind == FacilityKind::Hospital {
        for label in HOSPITAL_DEFAULT_SPECIALTIES {
            specialties.push((*label).to_owned());
        }
    }

    specialties
}

/// Assemble an address from structured parts in fixed order, skipping gaps.
fn build_address(record: &RawFacilityRecord) -> String {
    let parts: Vec<&str> = ["addr:housenumber", "addr:street", "addr:city", "addr:postcode"]
        .into_iter()
        .filter_map(|key| record.tag(key))
        .collect();

    if parts.is_empty() {
        ADDRESS_UNAVAILABLE.to_owned()
    } else {
        parts.join(", ")
    }
}

fn extract_amenities(record: &RawFacilityRecord) -> Vec<String> {
    AMENITY_FLAGS
        .iter()
        .filter(|(key, _)| record.tag_is_yes(key))
        .map(|(_, label)| (*label).to_owned())
        .collect()
}

fn push_unique(values: &mut Vec<String>, candidate: &str) {
    if !values.iter().any(|existing| existing == candidate) {
        values.push(candidate.to_owned());
    }
}
