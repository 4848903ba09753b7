//! Validated WGS84 coordinates.

use std::fmt;

use geo::{Coord, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
///
/// Construct values with [`GeoPoint::new`] to enforce the coordinate ranges.
/// Deserialisation applies the same validation.
///
/// # Examples
/// ```
/// use rendezvous_core::GeoPoint;
///
/// # fn main() -> Result<(), rendezvous_core::GeoPointError> {
/// let point = GeoPoint::new(25.03, 121.56)?;
/// assert_eq!(point.to_string(), "25.03,121.56");
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    /// Latitude in `[-90, 90]`.
    pub lat: f64,
    /// Longitude in `[-180, 180]`.
    pub lng: f64,
}

/// Errors returned by [`GeoPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoPointError {
    /// Latitude was outside `[-90, 90]` or not a number.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude was outside `[-180, 180]` or not a number.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoPointError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Validates and constructs a [`GeoPoint`].
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoPointError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoPointError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoPointError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Straight-line distance to `other` measured in degrees.
    ///
    /// Latitude and longitude are treated as planar axes. This is only
    /// meaningful at metropolitan scale, which is all the optimiser needs.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "planar distance is a floating-point computation"
    )]
    pub fn planar_distance(self, other: Self) -> f64 {
        (other.lat - self.lat).hypot(other.lng - self.lng)
    }

    /// Move `step` degrees along the straight line towards `target`.
    ///
    /// Returns `target` itself when it is closer than `step`, so the result
    /// never overshoots and always stays within the valid coordinate ranges.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "stepping along a unit vector is a floating-point computation"
    )]
    pub fn step_towards(self, target: Self, step: f64) -> Self {
        let distance = self.planar_distance(target);
        if distance <= step || distance == 0.0 {
            return target;
        }
        let scale = step / distance;
        Self {
            lat: self.lat + (target.lat - self.lat) * scale,
            lng: self.lng + (target.lng - self.lng) * scale,
        }
    }

    /// Great-circle distance to `other` in metres.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "the haversine formula is a floating-point computation"
    )]
    pub fn haversine_distance(self, other: Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_M * c
    }
}

impl fmt::Display for GeoPoint {
    /// Formats as `lat,lng`, the order routing services expect.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.lng,
            y: point.lat,
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.lng, point.lat)
    }
}
