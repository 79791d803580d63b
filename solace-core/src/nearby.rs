//! Nearest-neighbour ranking over geolocated records.
//!
//! [`NearestRanker`] drops candidates without a location, measures the
//! haversine distance from the origin to the rest, sorts ascending and keeps
//! the closest few. The sort is stable, so ties keep their input order.
//! [`NearbyQuery`] is the parse-and-validate step callers run on raw
//! coordinate strings before ranking.
//!
//! # Examples
//! ```
//! use solace_core::{GeoPoint, NearestRanker, TherapistLocationRecord};
//!
//! let origin = GeoPoint::new(37.7749, -122.4194)?;
//! let mut near = TherapistLocationRecord::default();
//! near.latitude = Some(37.7750);
//! near.longitude = Some(-122.4183);
//! let unplaced = TherapistLocationRecord::default();
//!
//! let ranked = NearestRanker::default().rank(origin, [near, unplaced]);
//! assert_eq!(ranked.len(), 1);
//! assert!(ranked[0].distance_km < 0.1);
//! # Ok::<(), solace_core::GeoPointError>(())
//! ```

use thiserror::Error;

use crate::{GeoPoint, haversine_km};

/// Default number of results returned by [`NearestRanker`].
pub const NEARBY_LIMIT: usize = 6;

/// Records that may carry a position.
pub trait Geolocated {
    /// Return the record's position, or `None` when it has not published a
    /// complete, finite one.
    fn location(&self) -> Option<GeoPoint>;
}

impl<T: Geolocated + ?Sized> Geolocated for &T {
    fn location(&self) -> Option<GeoPoint> {
        (**self).location()
    }
}

impl Geolocated for GeoPoint {
    fn location(&self) -> Option<GeoPoint> {
        Some(*self)
    }
}

/// A ranked record and its distance from the origin.
///
/// Serialises as the record's own fields plus `distance_km`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ranked<T> {
    /// The original record, unchanged.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub item: T,
    /// Great-circle distance from the origin in kilometres.
    pub distance_km: f64,
}

impl<T> Ranked<T> {
    /// Discard the distance and return the record.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.item
    }
}

/// Ranks candidates by distance from an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestRanker {
    limit: usize,
}

impl Default for NearestRanker {
    fn default() -> Self {
        Self {
            limit: NEARBY_LIMIT,
        }
    }
}

impl NearestRanker {
    /// Construct a ranker returning at most `limit` results.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    /// Maximum number of results.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Rank `candidates` by distance from `origin`.
    ///
    /// Returns `min(limit, geolocated candidates)` records in non-decreasing
    /// distance order. Candidates without a location never appear.
    pub fn rank<T, I>(&self, origin: GeoPoint, candidates: I) -> Vec<Ranked<T>>
    where
        T: Geolocated,
        I: IntoIterator<Item = T>,
    {
        let mut ranked: Vec<Ranked<T>> = candidates
            .into_iter()
            .filter_map(|item| {
                let position = item.location()?;
                Some(Ranked {
                    distance_km: haversine_km(origin, position),
                    item,
                })
            })
            .collect();
        ranked.sort_by(|left, right| left.distance_km.total_cmp(&right.distance_km));
        ranked.truncate(self.limit);
        ranked
    }
}

/// Rank `candidates` with the default limit of [`NEARBY_LIMIT`].
pub fn rank_nearest<T, I>(origin: GeoPoint, candidates: I) -> Vec<Ranked<T>>
where
    T: Geolocated,
    I: IntoIterator<Item = T>,
{
    NearestRanker::default().rank(origin, candidates)
}

/// Errors raised while validating raw coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NearbyQueryError {
    /// Latitude or longitude was absent or blank.
    #[error("Latitude and longitude are required.")]
    MissingCoordinates,
    /// A value was not a finite number.
    #[error("Invalid coordinates provided.")]
    InvalidCoordinates,
}

/// A validated nearby-search request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    origin: GeoPoint,
}

impl NearbyQuery {
    /// Parse raw latitude and longitude strings.
    ///
    /// Surrounding whitespace is ignored. The whole value must parse as a
    /// number; trailing text is rejected.
    ///
    /// # Errors
    /// [`NearbyQueryError::MissingCoordinates`] when either value is absent
    /// or blank, [`NearbyQueryError::InvalidCoordinates`] when either is not a
    /// finite number.
    ///
    /// # Examples
    /// ```
    /// use solace_core::{NearbyQuery, NearbyQueryError};
    ///
    /// let query = NearbyQuery::parse(Some("37.7749"), Some(" -122.4194 "))?;
    /// assert_eq!(query.origin().longitude(), -122.4194);
    ///
    /// assert_eq!(
    ///     NearbyQuery::parse(Some("NaN"), Some("0")),
    ///     Err(NearbyQueryError::InvalidCoordinates)
    /// );
    /// # Ok::<(), NearbyQueryError>(())
    /// ```
    pub fn parse(latitude: Option<&str>, longitude: Option<&str>) -> Result<Self, NearbyQueryError> {
        let (Some(raw_lat), Some(raw_lng)) = (present(latitude), present(longitude)) else {
            return Err(NearbyQueryError::MissingCoordinates);
        };
        let lat = parse_degrees(raw_lat)?;
        let lng = parse_degrees(raw_lng)?;
        let origin = GeoPoint::new(lat, lng).map_err(|_| NearbyQueryError::InvalidCoordinates)?;
        Ok(Self { origin })
    }

    /// Construct a query from an already validated point.
    #[must_use]
    pub const fn from_origin(origin: GeoPoint) -> Self {
        Self { origin }
    }

    /// The requester's position.
    #[must_use]
    pub const fn origin(&self) -> GeoPoint {
        self.origin
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_degrees(raw: &str) -> Result<f64, NearbyQueryError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(NearbyQueryError::InvalidCoordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    struct Pin {
        id: u32,
        at: Option<(f64, f64)>,
    }

    impl Geolocated for Pin {
        fn location(&self) -> Option<GeoPoint> {
            let (lat, lng) = self.at?;
            GeoPoint::new(lat, lng).ok()
        }
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(0.0, 0.0).expect("origin")
    }

    fn pin(id: u32, lat: f64, lng: f64) -> Pin {
        Pin {
            id,
            at: Some((lat, lng)),
        }
    }

    fn ids<T>(ranked: &[Ranked<T>], id: impl Fn(&T) -> u32) -> Vec<u32> {
        ranked.iter().map(|entry| id(&entry.item)).collect()
    }

    #[rstest]
    fn sorts_ascending_and_skips_unplaced() {
        let candidates = vec![
            pin(1, 0.0, 3.0),
            Pin { id: 2, at: None },
            pin(3, 0.0, 1.0),
            pin(4, 0.0, 2.0),
        ];
        let ranked = rank_nearest(origin(), candidates);
        assert_eq!(ids(&ranked, |p| p.id), vec![3, 4, 1]);
    }

    #[rstest]
    fn ties_keep_input_order() {
        let candidates = vec![pin(1, 0.0, 1.0), pin(2, 1.0, 0.0), pin(3, 0.0, -1.0)];
        let ranked = rank_nearest(origin(), candidates);
        assert_eq!(ids(&ranked, |p| p.id), vec![1, 2, 3]);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 2)]
    #[case(10, 4)]
    fn truncates_to_limit(#[case] limit: usize, #[case] expected: usize) {
        let candidates: Vec<_> = (1..=4).map(|id| pin(id, 0.0, f64::from(id))).collect();
        let ranked = NearestRanker::with_limit(limit).rank(origin(), candidates);
        assert_eq!(ranked.len(), expected);
    }

    #[rstest]
    fn ranks_borrowed_records() {
        let candidates = [pin(7, 0.0, 0.5)];
        let ranked = rank_nearest(origin(), candidates.iter());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.id, 7);
        assert_eq!(ranked[0].clone().into_inner(), &candidates[0]);
    }

    #[rstest]
    fn empty_input_yields_empty_output() {
        let ranked = rank_nearest(origin(), Vec::<Pin>::new());
        assert!(ranked.is_empty());
    }

    #[rstest]
    #[case(None, Some("1"))]
    #[case(Some("1"), None)]
    #[case(Some("   "), Some("1"))]
    #[case(Some(""), Some(""))]
    fn missing_values_are_reported(#[case] lat: Option<&str>, #[case] lng: Option<&str>) {
        assert_eq!(
            NearbyQuery::parse(lat, lng),
            Err(NearbyQueryError::MissingCoordinates)
        );
    }

    #[rstest]
    #[case("abc", "1")]
    #[case("12abc", "1")]
    #[case("1", "inf")]
    #[case("NaN", "1")]
    #[case("1", "-infinity")]
    fn invalid_values_are_reported(#[case] lat: &str, #[case] lng: &str) {
        assert_eq!(
            NearbyQuery::parse(Some(lat), Some(lng)),
            Err(NearbyQueryError::InvalidCoordinates)
        );
    }

    #[rstest]
    fn error_messages_match_the_http_boundary() {
        assert_eq!(
            NearbyQueryError::MissingCoordinates.to_string(),
            "Latitude and longitude are required."
        );
        assert_eq!(
            NearbyQueryError::InvalidCoordinates.to_string(),
            "Invalid coordinates provided."
        );
    }

    #[rstest]
    fn accepts_valid_coordinates() {
        let query = NearbyQuery::parse(Some("37.7749"), Some("-122.4194")).expect("valid query");
        assert_eq!(query.origin().latitude(), 37.7749);
        assert_eq!(query.origin().longitude(), -122.4194);
    }
}
