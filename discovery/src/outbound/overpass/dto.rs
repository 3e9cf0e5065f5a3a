//! DTOs for decoding Overpass JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into
//! domain records in one pass. Way-shaped elements carry their coordinates
//! in a `center` object because queries request centroid output.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::ports::RawFacilityRecord;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: String,
    pub(super) id: i64,
    pub(super) lat: Option<f64>,
    pub(super) lon: Option<f64>,
    pub(super) center: Option<OverpassElementCenterDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementCenterDto {
    pub(super) lat: f64,
    pub(super) lon: f64,
}

impl OverpassResponseDto {
    /// Map decoded elements into domain records.
    ///
    /// Elements without usable coordinates are dropped rather than failing
    /// the batch: one malformed record must not cost the whole mirror.
    pub(super) fn into_records(self) -> Vec<RawFacilityRecord> {
        self.elements
            .into_iter()
            .filter_map(OverpassElementDto::into_record)
            .collect()
    }
}

impl OverpassElementDto {
    fn into_record(self) -> Option<RawFacilityRecord> {
        let (latitude, longitude) = self.coordinates()?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        Some(RawFacilityRecord {
            element_type: self.element_type,
            element_id: self.id,
            latitude,
            longitude,
            tags: self.tags,
        })
    }

    fn coordinates(&self) -> Option<(f64, f64)> {
        if let (Some(latitude), Some(longitude)) = (self.lat, self.lon) {
            return Some((latitude, longitude));
        }
        self.center
            .as_ref()
            .map(|center| (center.lat, center.lon))
    }
}
