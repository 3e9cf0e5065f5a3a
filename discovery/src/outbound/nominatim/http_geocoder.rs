//! Reqwest-backed forward-geocoding adapter.
//!
//! Single attempt, no mirror list: the geocoding service shares the
//! external-unreliability risk of the mirrors but is deliberately not
//! engineered against it. The domain service maps every error to "no
//! location found".

use std::time::Duration;

use async_trait::async_trait;
use geodist::Coordinates;
use reqwest::{Client, Url};

use super::dto::NominatimPlaceDto;
use crate::domain::ports::{GeocodedLocation, GeocodingSource, GeocodingSourceError};
use crate::outbound::OutboundIdentity;

/// Default public geocoding endpoint.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Forward-geocoding adapter for a Nominatim-style endpoint.
pub struct NominatimHttpGeocoder {
    client: Client,
    base: Url,
    user_agent: String,
}

impl NominatimHttpGeocoder {
    /// Build an adapter against `base` with the default timeout and identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        Self::with_identity(base, DEFAULT_LOOKUP_TIMEOUT, OutboundIdentity::default())
    }

    /// Build an adapter with an explicit timeout and outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base: Url,
        timeout: Duration,
        identity: OutboundIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            user_agent: identity.user_agent,
        })
    }

    fn search_url(&self, address: &str) -> Result<Url, GeocodingSourceError> {
        let mut url = self.base.join("search").map_err(|error| {
            GeocodingSourceError::rejected(format!("invalid geocoder base URL: {error}"))
        })?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", address)
            .append_pair("limit", "1")
            .append_pair("addressdetails", "1");
        Ok(url)
    }
}

#[async_trait]
impl GeocodingSource for NominatimHttpGeocoder {
    async fn forward_search(
        &self,
        address: &str,
    ) -> Result<Option<GeocodedLocation>, GeocodingSourceError> {
        let url = self.search_url(address)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|error| GeocodingSourceError::transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingSourceError::rejected(format!(
                "status {}",
                status.as_u16()
            )));
        }

        let places: Vec<NominatimPlaceDto> = response
            .json()
            .await
            .map_err(|error| GeocodingSourceError::decode(error.to_string()))?;
        Ok(places.into_iter().next().and_then(into_location))
    }
}

fn into_location(place: NominatimPlaceDto) -> Option<GeocodedLocation> {
    let (latitude, longitude) = place.coordinates()?;
    let coordinates = Coordinates::try_new(latitude, longitude).ok()?;
    Some(GeocodedLocation {
        coordinates,
        display_name: place.display_name,
    })
}
