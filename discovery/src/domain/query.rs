//! Overpass QL generation for facility search.
//!
//! Pure string construction, no I/O. Real-world healthcare data is tagged
//! inconsistently under two parallel schemes (`amenity` and `healthcare`), so
//! every kind is matched under both where the schemes overlap. Way-shaped
//! records are asked for their centroid (`out center`) so the normalizer can
//! treat them uniformly with nodes.

use geodist::Coordinates;

use super::facility::{FacilityId, FacilityKind};

/// Minimal query used to probe mirror availability.
pub const PROBE_QUERY: &str = "[out:json];out;";

/// Regex alternation matching every supported kind under the `amenity` scheme.
const ANY_AMENITY_PATTERN: &str = "^(hospital|clinic|pharmacy|doctors)$";
/// Regex alternation matching every supported kind under the `healthcare` scheme.
const ANY_HEALTHCARE_PATTERN: &str = "^(hospital|clinic|doctor|pharmacy)$";

/// Build the facility-search query for an origin, radius, and optional kind.
///
/// The query requests node- and way-shaped records for each selected kind
/// within `radius_km * 1000` metres of the origin, matched under both tagging
/// schemes, and asks way records for centroid coordinates.
///
/// # Examples
/// ```
/// use discovery::domain::query::build_facility_query;
/// use geodist::Coordinates;
///
/// let origin = Coordinates::try_new(52.52, 13.405)?;
/// let query = build_facility_query(&origin, 10.0, None, 25);
/// assert!(query.contains("around:10000"));
/// assert!(query.contains("out center meta;"));
/// # Ok::<(), geodist::CoordinatesError>(())
/// ```
#[must_use]
pub fn build_facility_query(
    origin: &Coordinates,
    radius_km: f64,
    kind: Option<FacilityKind>,
    timeout_secs: u32,
) -> String {
    let radius_meters = radius_km * 1000.0;
    let around = format!(
        "(around:{radius_meters},{lat},{lon})",
        lat = origin.latitude(),
        lon = origin.longitude(),
    );

    let mut lines = Vec::new();
    for selector in kind_selectors(kind) {
        for element_type in ["node", "way"] {
            lines.push(format!("  {element_type}{selector}{around};"));
        }
    }

    format!(
        "[out:json][timeout:{timeout_secs}];\n(\n{clauses}\n);\nout center meta;",
        clauses = lines.join("\n"),
    )
}

/// Build a single-record lookup query for a known facility identity.
#[must_use]
pub fn build_detail_query(id: &FacilityId, timeout_secs: u32) -> String {
    format!(
        "[out:json][timeout:{timeout_secs}];\n(\n  {element_type}({element_id});\n);\nout center meta;",
        element_type = id.element_type,
        element_id = id.element_id,
    )
}

/// Tag selectors for one kind filter, in the order clauses are emitted.
fn kind_selectors(kind: Option<FacilityKind>) -> Vec<String> {
    match kind {
        Some(FacilityKind::Hospital) => vec![
            equals_selector("amenity", "hospital"),
            equals_selector("healthcare", "hospital"),
        ],
        Some(FacilityKind::Clinic) => vec![
            equals_selector("amenity", "clinic"),
            equals_selector("healthcare", "clinic"),
        ],
        // Pharmacies are only tagged under the amenity scheme.
        Some(FacilityKind::Pharmacy) => vec![equals_selector("amenity", "pharmacy")],
        Some(FacilityKind::GeneralPractice) => vec![
            equals_selector("amenity", "doctors"),
            equals_selector("healthcare", "doctor"),
        ],
        None => vec![
            regex_selector("amenity", ANY_AMENITY_PATTERN),
            regex_selector("healthcare", ANY_HEALTHCARE_PATTERN),
        ],
    }
}

fn equals_selector(key: &str, value: &str) -> String {
    format!("[\"{key}\"=\"{value}\"]")
}

fn regex_selector(key: &str, pattern: &str) -> String {
    format!("[\"{key}\"~\"{pattern}\"]")
}

#[cfg(test)]
mod tests {
    //! Substring assertions per filter combination; the builder is pure.

    use rstest::rstest;

    use super::*;

    fn origin() -> Coordinates {
        Coordinates::try_new(52.52, 13.405).expect("valid origin")
    }

    #[test]
    fn hospital_filter_emits_both_schemes_and_excludes_others() {
        let query = build_facility_query(&origin(), 10.0, Some(FacilityKind::Hospital), 25);

        assert!(query.contains("node[\"amenity\"=\"hospital\"](around:10000,52.52,13.405);"));
        assert!(query.contains("way[\"amenity\"=\"hospital\"](around:10000,52.52,13.405);"));
        assert!(query.contains("node[\"healthcare\"=\"hospital\"](around:10000,52.52,13.405);"));
        assert!(query.contains("way[\"healthcare\"=\"hospital\"](around:10000,52.52,13.405);"));
        assert!(!query.contains("clinic"), "hospital query must not match clinics");
        assert!(!query.contains("pharmacy"), "hospital query must not match pharmacies");
        assert!(!query.contains("doctors"), "hospital query must not match surgeries");
    }

    #[test]
    fn pharmacy_filter_uses_amenity_scheme_only() {
        let query = build_facility_query(&origin(), 5.0, Some(FacilityKind::Pharmacy), 25);

        assert!(query.contains("node[\"amenity\"=\"pharmacy\"](around:5000,52.52,13.405);"));
        assert!(query.contains("way[\"amenity\"=\"pharmacy\"](around:5000,52.52,13.405);"));
        assert!(
            !query.contains("healthcare"),
            "pharmacies are not tagged under the healthcare scheme"
        );
    }

    #[test]
    fn general_practice_filter_maps_to_upstream_doctor_tags() {
        let query = build_facility_query(&origin(), 10.0, Some(FacilityKind::GeneralPractice), 25);

        assert!(query.contains("node[\"amenity\"=\"doctors\"]"));
        assert!(query.contains("way[\"healthcare\"=\"doctor\"]"));
    }

    #[test]
    fn unfiltered_query_unions_all_kinds_under_both_schemes() {
        let query = build_facility_query(&origin(), 10.0, None, 25);

        assert!(query.contains("node[\"amenity\"~\"^(hospital|clinic|pharmacy|doctors)$\"]"));
        assert!(query.contains("way[\"amenity\"~\"^(hospital|clinic|pharmacy|doctors)$\"]"));
        assert!(query.contains("node[\"healthcare\"~\"^(hospital|clinic|doctor|pharmacy)$\"]"));
        assert!(query.contains("way[\"healthcare\"~\"^(hospital|clinic|doctor|pharmacy)$\"]"));
    }

    #[rstest]
    #[case(1.0, "around:1000,")]
    #[case(2.5, "around:2500,")]
    #[case(10.0, "around:10000,")]
    fn radius_is_converted_to_metres(#[case] radius_km: f64, #[case] expected: &str) {
        let query = build_facility_query(&origin(), radius_km, None, 25);
        assert!(query.contains(expected), "missing {expected} in query");
    }

    #[test]
    fn query_carries_timeout_directive_and_centroid_output() {
        let query = build_facility_query(&origin(), 10.0, None, 40);
        assert!(query.starts_with("[out:json][timeout:40];"));
        assert!(query.ends_with("out center meta;"));
    }

    #[test]
    fn detail_query_embeds_the_element_identity() {
        let id = FacilityId::new("way", 9_001);
        let query = build_detail_query(&id, 25);
        assert!(query.contains("way(9001);"));
        assert!(query.ends_with("out center meta;"));
    }
}
