//! Validated geographic points and great-circle distance.
//!
//! Coordinates are WGS84 degrees. Conversions to and from [`geo::Coord`] use
//! `x = longitude` and `y = latitude`.

use geo::Coord;
use thiserror::Error;

/// Mean Earth radius used for haversine distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair with finite components.
///
/// # Examples
/// ```
/// use solace_core::GeoPoint;
///
/// let point = GeoPoint::new(37.7749, -122.4194)?;
/// assert_eq!(point.latitude(), 37.7749);
/// assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
/// # Ok::<(), solace_core::GeoPointError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    coord: Coord<f64>,
}

/// Errors returned by [`GeoPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoPointError {
    /// Latitude was NaN or infinite.
    #[error("latitude must be a finite number")]
    NonFiniteLatitude,
    /// Longitude was NaN or infinite.
    #[error("longitude must be a finite number")]
    NonFiniteLongitude,
}

impl GeoPoint {
    /// Validate and construct a point from degrees.
    ///
    /// # Errors
    /// Returns [`GeoPointError`] when either component is not finite.
    pub const fn new(latitude: f64, longitude: f64) -> Result<Self, GeoPointError> {
        if !latitude.is_finite() {
            return Err(GeoPointError::NonFiniteLatitude);
        }
        if !longitude.is_finite() {
            return Err(GeoPointError::NonFiniteLongitude);
        }
        Ok(Self {
            coord: Coord {
                x: longitude,
                y: latitude,
            },
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.coord.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.coord.x
    }

    /// Return the point as a `geo` coordinate.
    #[must_use]
    pub const fn coord(self) -> Coord<f64> {
        self.coord
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(self, other: Self) -> f64 {
        haversine_km(self, other)
    }
}

impl TryFrom<Coord<f64>> for GeoPoint {
    type Error = GeoPointError;

    fn try_from(coord: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(coord.y, coord.x)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        point.coord
    }
}

/// Haversine distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`].
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
/// c = 2 · atan2(√a, √(1−a))
/// d = R · c
/// ```
///
/// `a` is clamped into `0.0..=1.0` so rounding near antipodal points cannot
/// produce NaN.
///
/// # Examples
/// ```
/// use solace_core::{GeoPoint, haversine_km};
///
/// let origin = GeoPoint::new(37.7749, -122.4194)?;
/// let nearby = GeoPoint::new(37.7750, -122.4183)?;
/// let distance = haversine_km(origin, nearby);
/// assert!((distance - 0.0973).abs() < 1e-3);
/// # Ok::<(), solace_core::GeoPointError>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "great-circle distance is floating-point trigonometry"
)]
#[must_use]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let d_lat = (to.latitude() - from.latitude()).to_radians();
    let d_lon = (to.longitude() - from.longitude()).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lon = (d_lon / 2.0).sin();
    let a = (sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon).clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).expect("finite coordinates")
    }

    #[rstest]
    #[case(f64::NAN, 0.0, GeoPointError::NonFiniteLatitude)]
    #[case(f64::INFINITY, 0.0, GeoPointError::NonFiniteLatitude)]
    #[case(0.0, f64::NEG_INFINITY, GeoPointError::NonFiniteLongitude)]
    #[case(0.0, f64::NAN, GeoPointError::NonFiniteLongitude)]
    fn rejects_non_finite_components(
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] expected: GeoPointError,
    ) {
        assert_eq!(GeoPoint::new(latitude, longitude), Err(expected));
    }

    #[rstest]
    fn points_can_be_built_in_const_context() {
        const ORIGIN: Result<GeoPoint, GeoPointError> = GeoPoint::new(37.7749, -122.4194);
        assert_eq!(ORIGIN, Ok(point(37.7749, -122.4194)));
    }

    #[rstest]
    fn coord_uses_longitude_as_x() {
        let coord = point(51.5, -0.1).coord();
        assert_eq!(coord, Coord { x: -0.1, y: 51.5 });
        assert_eq!(GeoPoint::try_from(coord), Ok(point(51.5, -0.1)));
    }

    #[rstest]
    fn identical_points_are_zero_apart() {
        let sf = point(37.7749, -122.4194);
        assert_eq!(haversine_km(sf, sf), 0.0);
    }

    #[rstest]
    fn one_degree_of_longitude_at_equator() {
        let distance = haversine_km(point(0.0, 0.0), point(0.0, 1.0));
        assert!((distance - 111.194_926_644_558_7).abs() < 1e-6);
    }

    #[rstest]
    fn london_to_paris() {
        let distance = haversine_km(point(51.5074, -0.1278), point(48.8566, 2.3522));
        assert!((distance - 343.556).abs() < 1e-2);
    }

    #[rstest]
    fn antipodal_points_stay_finite() {
        let distance = haversine_km(point(0.0, 0.0), point(0.0, 180.0));
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
