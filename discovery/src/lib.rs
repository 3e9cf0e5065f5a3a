//! Healthcare-facility discovery over public geodata mirrors.
//!
//! The crate queries an Overpass-style interpreter across an ordered list of
//! unreliable mirror endpoints, normalizes heterogeneous tag dictionaries
//! into a uniform [`Facility`](domain::Facility) model with great-circle
//! distances, and degrades to synthetic placeholder data when every mirror
//! fails. Siblings: forward geocoding of free-text addresses and a mirror
//! availability probe.
//!
//! Searches never fail for upstream reasons — callers inspect
//! [`FacilitySearchOutcome::used_fallback`](domain::FacilitySearchOutcome::used_fallback)
//! to warn users when live data was unavailable.

pub mod domain;
pub mod outbound;

pub use domain::{
    DataSource, DiscoveryConfig, Facility, FacilityDiscoveryPorts, FacilityDiscoveryService,
    FacilityId, FacilityKind, FacilitySearchOutcome, FacilitySearchRequest,
};
