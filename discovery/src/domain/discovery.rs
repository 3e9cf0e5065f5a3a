//! Facility discovery orchestration over unreliable mirror endpoints.
//!
//! The service owns the failover policy: mirrors are tried strictly in
//! order, one at a time, and the first successful response wins. Different
//! mirrors are assumed to have independent availability, so the next one is
//! tried immediately rather than backing off against the same endpoint.
//! When every mirror fails the search degrades to synthetic data — upstream
//! unavailability is never surfaced to callers as an error.

use std::sync::Arc;

use geodist::Coordinates;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::facility::{Facility, FacilityId, FacilityKind};
use super::fallback::synthetic_facilities;
use super::normalizer::normalize_records;
use super::ports::{FacilitySource, GeocodedLocation, GeocodingSource, RawFacilityRecord};
use super::query::{build_detail_query, build_facility_query};

/// Production mirror endpoints, tried first to last.
pub const DEFAULT_MIRROR_URLS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.osm.ch/api/interpreter",
];

const DEFAULT_QUERY_TIMEOUT_SECONDS: u32 = 25;

/// Discovery configuration: mirror order and query timeout directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Ordered mirror endpoints; failover walks this list front to back.
    pub mirrors: Vec<Url>,
    /// Timeout directive embedded in generated query text.
    pub query_timeout_secs: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            mirrors: DEFAULT_MIRROR_URLS
                .iter()
                .filter_map(|raw| Url::parse(raw).ok())
                .collect(),
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECONDS,
        }
    }
}

/// Port bundle required by the discovery service.
pub struct FacilityDiscoveryPorts {
    /// Outbound mirror query adapter.
    pub facility_source: Arc<dyn FacilitySource>,
    /// Outbound forward-geocoding adapter.
    pub geocoder: Arc<dyn GeocodingSource>,
}

impl FacilityDiscoveryPorts {
    /// Build a strongly-typed port bundle.
    pub fn new(facility_source: Arc<dyn FacilitySource>, geocoder: Arc<dyn GeocodingSource>) -> Self {
        Self {
            facility_source,
            geocoder,
        }
    }
}

/// One facility search, scoped to a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilitySearchRequest {
    /// Stable search identifier for trace correlation.
    pub search_id: Uuid,
    /// Query origin.
    pub origin: Coordinates,
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// Optional kind filter; `None` searches every kind.
    pub kind: Option<FacilityKind>,
}

impl FacilitySearchRequest {
    /// Build an unfiltered search with a fresh trace identifier.
    #[must_use]
    pub fn new(origin: Coordinates, radius_km: f64) -> Self {
        Self {
            search_id: Uuid::new_v4(),
            origin,
            radius_km,
            kind: None,
        }
    }

    /// Restrict the search to one facility kind.
    #[must_use]
    pub fn with_kind(mut self, kind: FacilityKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Where a search result came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Live data served by one mirror.
    Live {
        /// The mirror that answered.
        mirror: Url,
    },
    /// Synthetic placeholder data; every mirror failed.
    Synthetic,
}

/// Result of one facility search. Always produced, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilitySearchOutcome {
    /// Facilities sorted ascending by distance from the origin.
    pub facilities: Vec<Facility>,
    /// Provenance of the data.
    pub source: DataSource,
    /// Number of mirrors attempted before this outcome.
    pub mirror_attempts: u32,
}

impl FacilitySearchOutcome {
    /// Advisory flag: whether this search degraded to synthetic data.
    #[must_use]
    pub const fn used_fallback(&self) -> bool {
        matches!(self.source, DataSource::Synthetic)
    }
}

/// Stateless discovery service over the facility-source and geocoding ports.
///
/// Each call constructs its own query and loop state; there is no shared
/// mutable state between in-flight searches.
pub struct FacilityDiscoveryService {
    facility_source: Arc<dyn FacilitySource>,
    geocoder: Arc<dyn GeocodingSource>,
    config: DiscoveryConfig,
}

impl FacilityDiscoveryService {
    /// Build a service from its ports and configuration.
    #[must_use]
    pub fn new(ports: FacilityDiscoveryPorts, config: DiscoveryConfig) -> Self {
        Self {
            facility_source: ports.facility_source,
            geocoder: ports.geocoder,
            config,
        }
    }

    /// Search for healthcare facilities near an origin.
    ///
    /// Always resolves: upstream unavailability degrades to synthetic data,
    /// observable via [`FacilitySearchOutcome::used_fallback`].
    pub async fn search_nearby(&self, request: &FacilitySearchRequest) -> FacilitySearchOutcome {
        let query = build_facility_query(
            &request.origin,
            request.radius_km,
            request.kind,
            self.config.query_timeout_secs,
        );

        let mut attempts = 0_u32;
        for mirror in &self.config.mirrors {
            attempts += 1;
            match self.facility_source.fetch_records(mirror, &query).await {
                Ok(records) => {
                    let facilities = normalize_records(&request.origin, records);
                    debug!(
                        search_id = %request.search_id,
                        mirror = %mirror,
                        facility_count = facilities.len(),
                        "facility search served from mirror"
                    );
                    return FacilitySearchOutcome {
                        facilities,
                        source: DataSource::Live {
                            mirror: mirror.clone(),
                        },
                        mirror_attempts: attempts,
                    };
                }
                Err(error) if error.is_retryable_elsewhere() => {
                    debug!(
                        search_id = %request.search_id,
                        mirror = %mirror,
                        error = %error,
                        "mirror attempt failed, trying next"
                    );
                }
                Err(error) => {
                    warn!(
                        search_id = %request.search_id,
                        mirror = %mirror,
                        error = %error,
                        "mirror rejected query, trying next"
                    );
                }
            }
        }

        warn!(
            search_id = %request.search_id,
            mirror_attempts = attempts,
            "all mirrors unavailable, serving synthetic facilities"
        );
        FacilitySearchOutcome {
            facilities: synthetic_facilities(&request.origin, request.radius_km),
            source: DataSource::Synthetic,
            mirror_attempts: attempts,
        }
    }

    /// Look up coordinates for a free-text address.
    ///
    /// Single attempt; any failure is reported as "no location found".
    pub async fn search_location_by_address(&self, address: &str) -> Option<GeocodedLocation> {
        match self.geocoder.forward_search(address).await {
            Ok(location) => location,
            Err(error) => {
                warn!(error = %error, "address lookup failed");
                None
            }
        }
    }

    /// Probe each mirror with a minimal query until one responds.
    pub async fn check_availability(&self) -> bool {
        for mirror in &self.config.mirrors {
            match self.facility_source.probe(mirror).await {
                Ok(()) => return true,
                Err(error) => {
                    debug!(mirror = %mirror, error = %error, "mirror probe failed");
                }
            }
        }
        false
    }

    /// Fetch the raw upstream record for a known facility identity.
    ///
    /// Walks the mirror list like a search; `None` when no mirror yields the
    /// record.
    pub async fn facility_details(&self, id: &FacilityId) -> Option<RawFacilityRecord> {
        let query = build_detail_query(id, self.config.query_timeout_secs);
        for mirror in &self.config.mirrors {
            match self.facility_source.fetch_records(mirror, &query).await {
                Ok(records) => return records.into_iter().next(),
                Err(error) => {
                    debug!(
                        facility_id = %id,
                        mirror = %mirror,
                        error = %error,
                        "detail lookup failed on mirror"
                    );
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour coverage for the failover policy using mocked ports.

    use std::collections::BTreeMap;

    use mockall::predicate;
    use rstest::rstest;

    use super::super::ports::{
        FacilitySourceError, MockFacilitySource, MockGeocodingSource,
    };
    use super::*;

    fn origin() -> Coordinates {
        Coordinates::try_new(52.52, 13.405).expect("valid origin")
    }

    fn mirror(index: u32) -> Url {
        Url::parse(&format!("https://mirror-{index}.example/api/interpreter"))
            .expect("valid mirror url")
    }

    fn config(mirror_count: u32) -> DiscoveryConfig {
        DiscoveryConfig {
            mirrors: (1..=mirror_count).map(mirror).collect(),
            query_timeout_secs: 25,
        }
    }

    fn named_record(element_id: i64, name: &str) -> RawFacilityRecord {
        let mut tags = BTreeMap::new();
        tags.insert("name".to_owned(), name.to_owned());
        tags.insert("amenity".to_owned(), "clinic".to_owned());
        RawFacilityRecord {
            element_type: "node".to_owned(),
            element_id,
            latitude: 52.53,
            longitude: 13.41,
            tags,
        }
    }

    fn service(source: MockFacilitySource, geocoder: MockGeocodingSource, mirrors: u32) -> FacilityDiscoveryService {
        FacilityDiscoveryService::new(
            FacilityDiscoveryPorts::new(Arc::new(source), Arc::new(geocoder)),
            config(mirrors),
        )
    }

    #[tokio::test]
    async fn failover_serves_first_successful_mirror() {
        let mut source = MockFacilitySource::new();
        for index in 1..=2 {
            source
                .expect_fetch_records()
                .with(predicate::eq(mirror(index)), predicate::always())
                .times(1)
                .returning(|_, _| Err(FacilitySourceError::overloaded("status 503")));
        }
        source
            .expect_fetch_records()
            .with(predicate::eq(mirror(3)), predicate::always())
            .times(1)
            .returning(|_, _| Ok(vec![named_record(1, "Third Mirror Clinic")]));

        let service = service(source, MockGeocodingSource::new(), 3);
        let outcome = service
            .search_nearby(&FacilitySearchRequest::new(origin(), 10.0))
            .await;

        assert!(!outcome.used_fallback());
        assert_eq!(outcome.mirror_attempts, 3);
        assert_eq!(outcome.source, DataSource::Live { mirror: mirror(3) });
        assert_eq!(outcome.facilities.len(), 1);
        assert_eq!(outcome.facilities[0].name, "Third Mirror Clinic");
    }

    #[tokio::test]
    async fn first_success_stops_the_mirror_walk() {
        let mut source = MockFacilitySource::new();
        source
            .expect_fetch_records()
            .with(predicate::eq(mirror(1)), predicate::always())
            .times(1)
            .returning(|_, _| Ok(vec![named_record(1, "First Mirror Clinic")]));

        let service = service(source, MockGeocodingSource::new(), 3);
        let outcome = service
            .search_nearby(&FacilitySearchRequest::new(origin(), 10.0))
            .await;

        assert_eq!(outcome.mirror_attempts, 1);
        assert_eq!(outcome.source, DataSource::Live { mirror: mirror(1) });
    }

    #[rstest]
    #[case::timeout(FacilitySourceError::timeout("15s elapsed"))]
    #[case::transport(FacilitySourceError::transport("connection refused"))]
    #[case::decode(FacilitySourceError::decode("bad payload"))]
    #[case::rejected(FacilitySourceError::rejected("status 400"))]
    #[tokio::test]
    async fn total_failure_degrades_to_synthetic_data(#[case] error: FacilitySourceError) {
        let mut source = MockFacilitySource::new();
        source
            .expect_fetch_records()
            .times(3)
            .returning(move |_, _| Err(error.clone()));

        let service = service(source, MockGeocodingSource::new(), 3);
        let outcome = service
            .search_nearby(&FacilitySearchRequest::new(origin(), 10.0))
            .await;

        assert!(outcome.used_fallback());
        assert_eq!(outcome.mirror_attempts, 3);
        assert_eq!(outcome.facilities.len(), 4);
        assert!(
            outcome
                .facilities
                .windows(2)
                .all(|w| w[0].distance_km <= w[1].distance_km),
            "synthetic results must stay sorted"
        );
    }

    #[tokio::test]
    async fn kind_filter_reaches_the_generated_query() {
        let mut source = MockFacilitySource::new();
        source
            .expect_fetch_records()
            .withf(|_, query| query.contains("[\"amenity\"=\"pharmacy\"]"))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = service(source, MockGeocodingSource::new(), 1);
        let request =
            FacilitySearchRequest::new(origin(), 10.0).with_kind(FacilityKind::Pharmacy);
        let outcome = service.search_nearby(&request).await;
        assert!(!outcome.used_fallback());
        assert!(outcome.facilities.is_empty());
    }

    #[tokio::test]
    async fn availability_probe_stops_at_first_healthy_mirror() {
        let mut source = MockFacilitySource::new();
        source
            .expect_probe()
            .with(predicate::eq(mirror(1)))
            .times(1)
            .returning(|_| Err(FacilitySourceError::transport("unreachable")));
        source
            .expect_probe()
            .with(predicate::eq(mirror(2)))
            .times(1)
            .returning(|_| Ok(()));

        let service = service(source, MockGeocodingSource::new(), 3);
        assert!(service.check_availability().await);
    }

    #[tokio::test]
    async fn availability_is_false_when_every_probe_fails() {
        let mut source = MockFacilitySource::new();
        source
            .expect_probe()
            .times(3)
            .returning(|_| Err(FacilitySourceError::overloaded("status 503")));

        let service = service(source, MockGeocodingSource::new(), 3);
        assert!(!service.check_availability().await);
    }

    #[tokio::test]
    async fn geocoding_errors_become_no_match() {
        let mut geocoder = MockGeocodingSource::new();
        geocoder
            .expect_forward_search()
            .times(1)
            .returning(|_| Err(super::super::ports::GeocodingSourceError::transport("down")));

        let service = service(MockFacilitySource::new(), geocoder, 1);
        assert!(
            service
                .search_location_by_address("221B Baker Street")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn geocoding_match_passes_through() {
        let mut geocoder = MockGeocodingSource::new();
        geocoder.expect_forward_search().times(1).returning(|_| {
            Ok(Some(GeocodedLocation {
                coordinates: Coordinates::try_new(51.5237, -0.1585).expect("valid coordinates"),
                display_name: "Baker Street, London".to_owned(),
            }))
        });

        let service = service(MockFacilitySource::new(), geocoder, 1);
        let location = service
            .search_location_by_address("221B Baker Street")
            .await
            .expect("match expected");
        assert_eq!(location.display_name, "Baker Street, London");
    }

    #[tokio::test]
    async fn detail_lookup_fails_over_and_returns_first_record() {
        let mut source = MockFacilitySource::new();
        source
            .expect_fetch_records()
            .with(predicate::eq(mirror(1)), predicate::always())
            .times(1)
            .returning(|_, _| Err(FacilitySourceError::timeout("15s elapsed")));
        source
            .expect_fetch_records()
            .withf(|endpoint, query| {
                endpoint == &Url::parse("https://mirror-2.example/api/interpreter")
                    .expect("valid mirror url")
                    && query.contains("node(42);")
            })
            .times(1)
            .returning(|_, _| Ok(vec![named_record(42, "Detail Clinic")]));

        let service = service(source, MockGeocodingSource::new(), 2);
        let record = service
            .facility_details(&FacilityId::new("node", 42))
            .await
            .expect("record expected");
        assert_eq!(record.element_id, 42);
    }

    #[tokio::test]
    async fn detail_lookup_returns_none_when_all_mirrors_fail() {
        let mut source = MockFacilitySource::new();
        source
            .expect_fetch_records()
            .times(2)
            .returning(|_, _| Err(FacilitySourceError::overloaded("status 502")));

        let service = service(source, MockGeocodingSource::new(), 2);
        assert!(
            service
                .facility_details(&FacilityId::new("node", 42))
                .await
                .is_none()
        );
    }
}
