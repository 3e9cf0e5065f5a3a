//! Driven port for fetching raw facility records from a geodata mirror.
//!
//! The domain owns the record shape and error contract so the failover loop
//! stays adapter-agnostic: it only needs to know whether an attempt is worth
//! repeating against the next mirror.

use std::collections::BTreeMap;

use async_trait::async_trait;
use url::Url;

/// One raw tagged record returned by a mirror before normalization.
///
/// Constructed fresh per query response and consumed once by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFacilityRecord {
    /// Upstream element kind (`node` or `way`).
    pub element_type: String,
    /// Raw upstream element identifier.
    pub element_id: i64,
    /// Latitude in WGS84 degrees (way records carry their centroid).
    pub latitude: f64,
    /// Longitude in WGS84 degrees.
    pub longitude: f64,
    /// Loosely-typed tag dictionary with open-ended keys.
    pub tags: BTreeMap<String, String>,
}

impl RawFacilityRecord {
    /// Look up a tag value by key.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether a boolean-style tag is set to `yes`.
    #[must_use]
    pub fn tag_is_yes(&self, key: &str) -> bool {
        self.tags.get(key).is_some_and(|value| value == "yes")
    }
}

/// Errors surfaced while querying one mirror.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FacilitySourceError {
    /// Network transport failed before receiving a response.
    #[error("mirror transport failed: {message}")]
    Transport {
        /// Underlying transport failure description.
        message: String,
    },
    /// The attempt exceeded its bounded timeout.
    #[error("mirror timed out: {message}")]
    Timeout {
        /// Timeout description.
        message: String,
    },
    /// The mirror rate-limited the request (HTTP 429).
    #[error("mirror rate limited request: {message}")]
    RateLimited {
        /// Rate-limit response description.
        message: String,
    },
    /// The mirror reported a transient server overload (HTTP 502/503/504).
    #[error("mirror overloaded: {message}")]
    Overloaded {
        /// Overload response description.
        message: String,
    },
    /// The response body could not be decoded as a record batch.
    #[error("mirror response decode failed: {message}")]
    Decode {
        /// Decode failure description.
        message: String,
    },
    /// The mirror rejected the query outright (other non-2xx statuses).
    #[error("mirror rejected query: {message}")]
    Rejected {
        /// Rejection description.
        message: String,
    },
}

impl FacilitySourceError {
    /// Construct a [`FacilitySourceError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Construct a [`FacilitySourceError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Construct a [`FacilitySourceError::RateLimited`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Construct a [`FacilitySourceError::Overloaded`].
    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::Overloaded {
            message: message.into(),
        }
    }

    /// Construct a [`FacilitySourceError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Construct a [`FacilitySourceError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Whether an independent mirror is likely to serve the same query.
    ///
    /// Transient conditions and malformed payloads are expected to be
    /// mirror-local; an outright rejection suggests the query itself is bad.
    #[must_use]
    pub const fn is_retryable_elsewhere(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::Overloaded { .. }
                | Self::Decode { .. }
        )
    }
}

/// Port for querying one mirror endpoint for facility records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FacilitySource: Send + Sync {
    /// Execute a query against `endpoint` and return the decoded records.
    async fn fetch_records(
        &self,
        endpoint: &Url,
        query: &str,
    ) -> Result<Vec<RawFacilityRecord>, FacilitySourceError>;

    /// Issue a minimal request against `endpoint` to check it is serving.
    async fn probe(&self, endpoint: &Url) -> Result<(), FacilitySourceError>;
}

/// Fixture implementation returning empty batches and healthy probes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureFacilitySource;

#[async_trait]
impl FacilitySource for FixtureFacilitySource {
    async fn fetch_records(
        &self,
        _endpoint: &Url,
        _query: &str,
    ) -> Result<Vec<RawFacilityRecord>, FacilitySourceError> {
        Ok(Vec::new())
    }

    async fn probe(&self, _endpoint: &Url) -> Result<(), FacilitySourceError> {
        Ok(())
    }
}
