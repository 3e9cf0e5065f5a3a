//! Nominatim geocoding outbound adapter.
//!
//! A thin HTTP implementation of the `GeocodingSource` port.

mod dto;
mod http_geocoder;

pub use http_geocoder::{NominatimHttpGeocoder, DEFAULT_GEOCODER_URL};
