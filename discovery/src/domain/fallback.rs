//! Synthetic placeholder facilities served when every mirror fails.
//!
//! The set of names, kinds, and relative distances is fixed so the UI is
//! never empty during interpreter outages; only the coordinates jitter.
//! Callers must distinguish this data from live results via the outcome's
//! data-source marker.

use geodist::{Coordinates, round_to_hundredths};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::facility::{Facility, FacilityId, FacilityKind};

/// Requested radii are clamped to this band before distance scaling.
const MIN_BASE_RADIUS_KM: f64 = 5.0;
/// Upper clamp of the distance-scaling base.
const MAX_BASE_RADIUS_KM: f64 = 50.0;
/// Placeholder coordinates jitter within this many degrees of the origin.
const JITTER_DEGREES: f64 = 0.025;

/// Generate the four placeholder facilities, sorted by distance.
#[must_use]
pub fn synthetic_facilities(origin: &Coordinates, radius_km: f64) -> Vec<Facility> {
    synthetic_facilities_with_rng(origin, radius_km, &mut SmallRng::from_entropy())
}

fn synthetic_facilities_with_rng<R: Rng>(
    origin: &Coordinates,
    radius_km: f64,
    rng: &mut R,
) -> Vec<Facility> {
    let base_km = radius_km.clamp(MIN_BASE_RADIUS_KM, MAX_BASE_RADIUS_KM);

    let mut facilities = vec![
        placeholder(
            rng,
            origin,
            1,
            "City General Hospital",
            FacilityKind::Hospital,
            base_km * 0.3,
            "123 Main St, Downtown",
            Some("+1 555-0101"),
            Some("https://example-hospital.test"),
        ),
        placeholder(
            rng,
            origin,
            2,
            "Downtown Clinic",
            FacilityKind::Clinic,
            base_km * 0.45,
            "45 Elm Ave, Central",
            None,
            None,
        ),
        placeholder(
            rng,
            origin,
            3,
            "Community Pharmacy",
            FacilityKind::Pharmacy,
            base_km * 0.2,
            "78 Oak Rd, Midtown",
            None,
            None,
        ),
        placeholder(
            rng,
            origin,
            4,
            "Family Doctors Center",
            FacilityKind::GeneralPractice,
            base_km * 0.6,
            "22 Pine St, Westside",
            None,
            None,
        ),
    ];
    facilities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    facilities
}

#[expect(clippy::too_many_arguments, reason = "flat placeholder constructor")]
fn placeholder<R: Rng>(
    rng: &mut R,
    origin: &Coordinates,
    element_id: i64,
    name: &str,
    kind: FacilityKind,
    distance_km: f64,
    address: &str,
    phone: Option<&str>,
    website: Option<&str>,
) -> Facility {
    let is_hospital = kind == FacilityKind::Hospital;
    let specialties = if is_hospital {
        vec!["General Medicine".to_owned(), "Emergency Care".to_owned()]
    } else {
        vec!["Family Medicine".to_owned()]
    };

    Facility {
        id: FacilityId::new("synthetic", element_id),
        name: name.to_owned(),
        kind,
        specialties,
        position: jittered_position(rng, origin),
        distance_km: round_to_hundredths(distance_km),
        address: address.to_owned(),
        phone: phone.map(str::to_owned),
        website: website.map(str::to_owned),
        email: None,
        opening_hours: Some("Mo-Fr 08:00-18:00".to_owned()),
        emergency: is_hospital,
        bed_capacity: is_hospital.then_some(120),
        amenities: vec![
            "Parking Available".to_owned(),
            "Wheelchair Accessible".to_owned(),
        ],
        wheelchair_accessible: true,
    }
}

fn jittered_position<R: Rng>(rng: &mut R, origin: &Coordinates) -> Coordinates {
    let latitude = (origin.latitude() + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES))
        .clamp(-90.0, 90.0);
    let longitude = (origin.longitude() + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES))
        .clamp(-180.0, 180.0);
    // Clamped jitter around a validated origin always revalidates.
    Coordinates::try_new(latitude, longitude).unwrap_or(*origin)
}
