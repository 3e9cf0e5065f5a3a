//! Reqwest-backed mirror query adapter.
//!
//! This adapter owns transport details only: request serialisation, the
//! per-attempt timeout, HTTP status mapping, and JSON decoding into domain
//! records. Failover across mirrors belongs to the domain service; this
//! type is endpoint-agnostic and queries whichever mirror it is handed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::OverpassResponseDto;
use crate::domain::ports::{FacilitySource, FacilitySourceError, RawFacilityRecord};
use crate::domain::query::PROBE_QUERY;
use crate::outbound::OutboundIdentity;

/// Per-attempt request timeout; mirrors that stall are abandoned.
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Mirror query adapter performing HTTP POST requests against one endpoint
/// at a time.
pub struct OverpassHttpSource {
    client: Client,
    user_agent: String,
}

impl OverpassHttpSource {
    /// Build an adapter with the default timeout and outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_identity(DEFAULT_ATTEMPT_TIMEOUT, OutboundIdentity::default())
    }

    /// Build an adapter with an explicit per-attempt timeout and identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        timeout: Duration,
        identity: OutboundIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_agent: identity.user_agent,
        })
    }
}

#[async_trait]
impl FacilitySource for OverpassHttpSource {
    async fn fetch_records(
        &self,
        endpoint: &Url,
        query: &str,
    ) -> Result<Vec<RawFacilityRecord>, FacilitySourceError> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .body(query.to_owned())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_records(body.as_ref())
    }

    async fn probe(&self, endpoint: &Url) -> Result<(), FacilitySourceError> {
        let mut url = endpoint.clone();
        url.query_pairs_mut().append_pair("data", PROBE_QUERY);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(map_status_error(status, &[]))
        }
    }
}

fn parse_records(body: &[u8]) -> Result<Vec<RawFacilityRecord>, FacilitySourceError> {
    let decoded: OverpassResponseDto = serde_json::from_slice(body).map_err(|error| {
        FacilitySourceError::decode(format!("invalid mirror JSON payload: {error}"))
    })?;
    Ok(decoded.into_records())
}

fn map_transport_error(error: reqwest::Error) -> FacilitySourceError {
    if error.is_timeout() {
        FacilitySourceError::timeout(error.to_string())
    } else {
        FacilitySourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> FacilitySourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => FacilitySourceError::rate_limited(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            FacilitySourceError::overloaded(message)
        }
        _ => FacilitySourceError::rejected(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::bad_gateway(StatusCode::BAD_GATEWAY, "Overloaded")]
    #[case::service_unavailable(StatusCode::SERVICE_UNAVAILABLE, "Overloaded")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Overloaded")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::not_found(StatusCode::NOT_FOUND, "Rejected")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Rejected")]
    fn maps_http_statuses_to_expected_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"remark\":\"backend unavailable\"}");
        let matches_expected = match expected {
            "RateLimited" => matches!(error, FacilitySourceError::RateLimited { .. }),
            "Overloaded" => matches!(error, FacilitySourceError::Overloaded { .. }),
            "Rejected" => matches!(error, FacilitySourceError::Rejected { .. }),
            _ => false,
        };
        assert!(matches_expected, "{status} mapped to unexpected {error:?}");
    }

    #[test]
    fn retryable_elsewhere_statuses_line_up_with_the_failover_contract() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            assert!(
                map_status_error(status, &[]).is_retryable_elsewhere(),
                "{status} must be retryable on another mirror"
            );
        }
        assert!(!map_status_error(StatusCode::FORBIDDEN, &[]).is_retryable_elsewhere());
    }

    #[test]
    fn parses_node_and_centroid_elements_into_records() {
        let body = r#"{
            "elements": [
                {
                    "type": "node",
                    "id": 101,
                    "lat": 52.53,
                    "lon": 13.41,
                    "tags": { "name": "Node Clinic", "amenity": "clinic" }
                },
                {
                    "type": "way",
                    "id": 102,
                    "center": { "lat": 52.54, "lon": 13.42 },
                    "tags": { "name": "Way Hospital", "amenity": "hospital" }
                }
            ]
        }"#;

        let records = parse_records(body.as_bytes()).expect("JSON should decode");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].element_type, "node");
        assert_eq!(records[0].latitude, 52.53);
        assert_eq!(records[1].element_type, "way");
        assert_eq!(records[1].longitude, 13.42);
    }

    #[test]
    fn elements_without_coordinates_are_dropped_not_fatal() {
        let body = r#"{
            "elements": [
                { "type": "way", "id": 201, "tags": { "name": "No Centre" } },
                {
                    "type": "node",
                    "id": 202,
                    "lat": 52.53,
                    "lon": 13.41,
                    "tags": { "name": "Good Node" }
                }
            ]
        }"#;

        let records = parse_records(body.as_bytes()).expect("JSON should decode");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].element_id, 202);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let error = parse_records(b"<html>busy</html>").expect_err("decode should fail");
        assert!(matches!(error, FacilitySourceError::Decode { .. }));
        assert!(error.is_retryable_elsewhere());
    }

    #[test]
    fn empty_elements_array_decodes_to_no_records() {
        let records = parse_records(br#"{"elements": []}"#).expect("JSON should decode");
        assert!(records.is_empty());
    }

    #[test]
    fn body_preview_compacts_and_truncates() {
        let long_body = "x".repeat(400);
        let preview = body_preview(long_body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);

        assert_eq!(body_preview(b"too   many\n\nretries"), "too many retries");
    }
}
