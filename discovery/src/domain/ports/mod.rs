//! Domain ports for the hexagonal boundary.
//!
//! Ports are driven traits implemented by outbound adapters. Each carries its
//! own error enum with lower-snake constructor helpers; mocks are generated
//! for unit tests, and fixture implementations exist for wiring smoke tests.

mod facility_source;
mod geocoding;

#[cfg(test)]
pub use facility_source::MockFacilitySource;
pub use facility_source::{
    FacilitySource, FacilitySourceError, FixtureFacilitySource, RawFacilityRecord,
};
#[cfg(test)]
pub use geocoding::MockGeocodingSource;
pub use geocoding::{
    FixtureGeocodingSource, GeocodedLocation, GeocodingSource, GeocodingSourceError,
};
