//! Driven port for forward geocoding of free-text addresses.
//!
//! A deliberately simpler contract than the facility source: one attempt, no
//! mirror list. The caller decides what "no match" means for its UI.

use async_trait::async_trait;
use geodist::Coordinates;

/// Coordinates and display name of the best match for an address lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedLocation {
    /// Matched position.
    pub coordinates: Coordinates,
    /// Human-readable name of the match.
    pub display_name: String,
}

/// Errors surfaced while calling the geocoding service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodingSourceError {
    /// Network transport failed before receiving a response.
    #[error("geocoding transport failed: {message}")]
    Transport {
        /// Underlying transport failure description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("geocoding response decode failed: {message}")]
    Decode {
        /// Decode failure description.
        message: String,
    },
    /// The service answered with a non-2xx status.
    #[error("geocoding request rejected: {message}")]
    Rejected {
        /// Rejection description.
        message: String,
    },
}

impl GeocodingSourceError {
    /// Construct a [`GeocodingSourceError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Construct a [`GeocodingSourceError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Construct a [`GeocodingSourceError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Port for looking up coordinates for a free-text address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingSource: Send + Sync {
    /// Return the first match for `address`, or `None` when nothing matches.
    async fn forward_search(
        &self,
        address: &str,
    ) -> Result<Option<GeocodedLocation>, GeocodingSourceError>;
}

/// Fixture implementation that never finds a match.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureGeocodingSource;

#[async_trait]
impl GeocodingSource for FixtureGeocodingSource {
    async fn forward_search(
        &self,
        _address: &str,
    ) -> Result<Option<GeocodedLocation>, GeocodingSourceError> {
        Ok(None)
    }
}
