//! Therapist roster records.

use crate::{GeoPoint, Geolocated, Ranked};

/// Identity and display fields for a therapist.
///
/// The ranking logic treats these as opaque; they are carried through to the
/// output untouched. Missing fields deserialise to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TherapistProfile {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Professional credentials, for example `LMFT`.
    pub credentials: String,
    /// Areas of specialisation.
    pub specializations: Vec<String>,
    /// Free-form biography.
    pub bio: String,
    /// Years in practice.
    pub years_experience: u32,
    /// Self-described gender.
    pub gender: String,
    /// Languages offered.
    pub languages: Vec<String>,
    /// Therapeutic approaches, for example CBT.
    pub therapy_approaches: Vec<String>,
    /// Lower bound of the session fee.
    pub session_rate_min: u32,
    /// Upper bound of the session fee.
    pub session_rate_max: u32,
    /// Whether insurance is accepted.
    pub accepts_insurance: bool,
    /// Whether the profile has been verified.
    pub verified: bool,
    /// City of practice.
    pub city: String,
    /// State or region of practice.
    pub state: String,
}

/// A therapist with an optional published location.
///
/// # Examples
/// ```
/// use solace_core::{Geolocated, TherapistLocationRecord};
///
/// let mut record = TherapistLocationRecord::default();
/// assert!(record.location().is_none());
///
/// record.latitude = Some(37.7750);
/// record.longitude = Some(-122.4183);
/// assert!(record.location().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TherapistLocationRecord {
    /// Identity and display fields.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub profile: TherapistProfile,
    /// Latitude in degrees, when published.
    #[cfg_attr(feature = "serde", serde(default))]
    pub latitude: Option<f64>,
    /// Longitude in degrees, when published.
    #[cfg_attr(feature = "serde", serde(default))]
    pub longitude: Option<f64>,
}

impl TherapistLocationRecord {
    /// Construct a record from a profile and optional coordinates.
    #[must_use]
    pub const fn new(
        profile: TherapistProfile,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            profile,
            latitude,
            longitude,
        }
    }
}

impl Geolocated for TherapistLocationRecord {
    /// Both coordinates must be present and finite.
    fn location(&self) -> Option<GeoPoint> {
        let (latitude, longitude) = self.latitude.zip(self.longitude)?;
        GeoPoint::new(latitude, longitude).ok()
    }
}

/// A therapist record annotated with its distance from the requester.
pub type RankedTherapist = Ranked<TherapistLocationRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(1.0), None)]
    #[case(None, Some(1.0))]
    #[case(Some(f64::NAN), Some(1.0))]
    fn incomplete_coordinates_are_not_geolocated(
        #[case] latitude: Option<f64>,
        #[case] longitude: Option<f64>,
    ) {
        let record = TherapistLocationRecord::new(TherapistProfile::default(), latitude, longitude);
        assert!(record.location().is_none());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn flattens_profile_fields() {
        let json = r#"{
            "id": "t-1",
            "full_name": "Dr. Rivera",
            "specializations": ["anxiety"],
            "verified": true,
            "latitude": 37.7,
            "longitude": null
        }"#;
        let record: TherapistLocationRecord =
            serde_json::from_str(json).expect("deserialise therapist");
        assert_eq!(record.profile.full_name, "Dr. Rivera");
        assert_eq!(record.profile.specializations, vec!["anxiety".to_owned()]);
        assert!(record.profile.bio.is_empty());
        assert_eq!(record.latitude, Some(37.7));
        assert!(record.longitude.is_none());
    }
}
