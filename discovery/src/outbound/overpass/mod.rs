//! Overpass mirror outbound adapter.
//!
//! A thin HTTP implementation of the `FacilitySource` port; the failover
//! policy across mirrors lives in the domain service.

mod dto;
mod http_source;

pub use http_source::OverpassHttpSource;
