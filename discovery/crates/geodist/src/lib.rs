//! WGS84 coordinate and great-circle distance primitives.
//!
//! Purpose: give the discovery crate one validated coordinate type and one
//! distance implementation so adapters and domain services cannot disagree on
//! geospatial maths. Distances use the Haversine formula on a spherical
//! Earth, which is accurate to well under a percent at the radii involved in
//! facility search.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Validation errors returned by [`Coordinates::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatesError {
    /// Latitude or longitude was NaN or infinite.
    #[error("coordinates must be finite")]
    NotFinite,
    /// Latitude fell outside `[-90, 90]` degrees.
    #[error("latitude must be within [-90, 90] degrees")]
    LatitudeOutOfRange,
    /// Longitude fell outside `[-180, 180]` degrees.
    #[error("longitude must be within [-180, 180] degrees")]
    LongitudeOutOfRange,
}

/// A validated WGS84 point in floating-point degrees.
///
/// ## Invariants
/// - Both components are finite.
/// - Latitude is within `[-90, 90]`, longitude within `[-180, 180]`.
///
/// # Examples
/// ```
/// use geodist::Coordinates;
///
/// let origin = Coordinates::try_new(52.52, 13.405)?;
/// assert_eq!(origin.latitude(), 52.52);
/// # Ok::<(), geodist::CoordinatesError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinatesDto", into = "CoordinatesDto")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CoordinatesDto {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<CoordinatesDto> for Coordinates {
    type Error = CoordinatesError;

    fn try_from(dto: CoordinatesDto) -> Result<Self, Self::Error> {
        Self::try_new(dto.latitude, dto.longitude)
    }
}

impl From<Coordinates> for CoordinatesDto {
    fn from(value: Coordinates) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns a [`CoordinatesError`] when either component is non-finite or
    /// outside the WGS84 range.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinatesError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres.
    ///
    /// # Examples
    /// ```
    /// use geodist::Coordinates;
    ///
    /// let berlin = Coordinates::try_new(52.52, 13.405)?;
    /// let hamburg = Coordinates::try_new(53.551, 9.993)?;
    /// let d = berlin.distance_km(&hamburg);
    /// assert!((250.0..260.0).contains(&d));
    /// # Ok::<(), geodist::CoordinatesError>(())
    /// ```
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(self, other)
    }
}

/// Haversine great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let half_chord = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let central_angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());
    EARTH_RADIUS_KM * central_angle
}

/// Round a distance to two decimal places for presentation.
#[must_use]
pub fn round_to_hundredths(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
