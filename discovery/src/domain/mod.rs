//! Domain model and services for healthcare-facility discovery.
//!
//! Purpose: hold all behaviour that is independent of transport — query
//! generation, normalization, distance maths, the synthetic fallback, and
//! the mirror-failover policy — behind ports implemented by `outbound`
//! adapters. Types are value objects; each search owns its own state.

pub mod discovery;
pub mod facility;
pub mod fallback;
pub mod normalizer;
pub mod ports;
pub mod query;

pub use self::discovery::{
    DataSource, DiscoveryConfig, FacilityDiscoveryPorts, FacilityDiscoveryService,
    FacilitySearchOutcome, FacilitySearchRequest, DEFAULT_MIRROR_URLS,
};
pub use self::facility::{Facility, FacilityId, FacilityKind, FacilityKindParseError};
