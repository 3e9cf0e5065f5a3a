//! DTOs for decoding Nominatim search responses.
//!
//! Forward search returns a JSON array of places; coordinates arrive as
//! strings and must be parsed before they can become domain values.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct NominatimPlaceDto {
    pub(super) lat: String,
    pub(super) lon: String,
    pub(super) display_name: String,
}

impl NominatimPlaceDto {
    /// Parse the string-typed coordinate pair.
    pub(super) fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = self.lat.trim().parse().ok()?;
        let longitude = self.lon.trim().parse().ok()?;
        Some((latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for string-typed coordinate parsing.

    use super::*;

    #[test]
    fn parses_string_coordinates() {
        let place = NominatimPlaceDto {
            lat: "52.5200".to_owned(),
            lon: "13.4050".to_owned(),
            display_name: "Berlin".to_owned(),
        };
        assert_eq!(place.coordinates(), Some((52.52, 13.405)));
    }

    #[test]
    fn unparsable_coordinates_yield_none() {
        let place = NominatimPlaceDto {
            lat: "not-a-number".to_owned(),
            lon: "13.4050".to_owned(),
            display_name: "Nowhere".to_owned(),
        };
        assert_eq!(place.coordinates(), None);
    }
}
