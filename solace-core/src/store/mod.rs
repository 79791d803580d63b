//! Persistence traits for the therapist roster and recommendation sets.
//!
//! The core never calls a store itself. Collaborators read candidates from a
//! [`TherapistDirectory`] before ranking and write covered sets through a
//! [`RecommendationStore`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{RecommendationItem, TherapistLocationRecord};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteStore, SqliteStoreError};

/// Read access to therapists that can appear in nearby results.
///
/// # Examples
/// ```
/// use std::convert::Infallible;
/// use solace_core::{TherapistDirectory, TherapistLocationRecord};
///
/// struct Roster(Vec<TherapistLocationRecord>);
///
/// impl TherapistDirectory for Roster {
///     type Error = Infallible;
///
///     fn nearby_candidates(&self) -> Result<Vec<TherapistLocationRecord>, Self::Error> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let roster = Roster(vec![TherapistLocationRecord::default()]);
/// assert_eq!(roster.nearby_candidates().map(|c| c.len()), Ok(1));
/// ```
pub trait TherapistDirectory {
    /// Failure raised by the backing store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return verified therapists who are accepting new clients, with or
    /// without coordinates.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the roster cannot be read.
    fn nearby_candidates(&self) -> Result<Vec<TherapistLocationRecord>, Self::Error>;
}

/// Per-user recommendation persistence.
pub trait RecommendationStore {
    /// Failure raised by the backing store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Delete the user's existing recommendations and insert `items` in
    /// order, returning the stored rows.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the replacement cannot be completed; no
    /// partial set is left behind.
    fn replace_for_user(
        &self,
        user_id: &str,
        items: &[RecommendationItem],
    ) -> Result<Vec<StoredRecommendation>, Self::Error>;

    /// Record feedback on one of the user's recommendations.
    ///
    /// Returns `false` when no recommendation with that id belongs to the
    /// user.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the update fails.
    fn record_feedback(
        &self,
        user_id: &str,
        recommendation_id: i64,
        feedback: Feedback,
    ) -> Result<bool, Self::Error>;

    /// Return the user's stored recommendations in insertion order.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the rows cannot be read.
    fn recommendations_for(&self, user_id: &str) -> Result<Vec<StoredRecommendation>, Self::Error>;
}

/// User reaction to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Feedback {
    /// The suggestion helped.
    Helpful,
    /// The suggestion did not help.
    NotHelpful,
    /// The user saved the suggestion for later.
    Saved,
}

impl Feedback {
    /// Return the stored tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Helpful => "helpful",
            Self::NotHelpful => "not_helpful",
            Self::Saved => "saved",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown feedback tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid feedback '{value}'; expected helpful, not_helpful or saved")]
pub struct InvalidFeedback {
    /// Rejected input.
    pub value: String,
}

impl FromStr for Feedback {
    type Err = InvalidFeedback;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helpful" => Ok(Self::Helpful),
            "not_helpful" => Ok(Self::NotHelpful),
            "saved" => Ok(Self::Saved),
            other => Err(InvalidFeedback {
                value: other.to_owned(),
            }),
        }
    }
}

/// Roster entry as imported into a store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TherapistRow {
    /// Profile and optional location.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub record: TherapistLocationRecord,
    /// Whether the therapist is taking new clients.
    #[cfg_attr(feature = "serde", serde(default = "accepting_by_default"))]
    pub is_accepting_clients: bool,
}

impl From<TherapistLocationRecord> for TherapistRow {
    fn from(record: TherapistLocationRecord) -> Self {
        Self {
            record,
            is_accepting_clients: true,
        }
    }
}

impl TherapistRow {
    /// Report whether the row is eligible for nearby results.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        self.record.profile.verified && self.is_accepting_clients
    }
}

#[cfg(feature = "serde")]
const fn accepting_by_default() -> bool {
    true
}

/// A recommendation persisted for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoredRecommendation {
    /// Row identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: String,
    /// The recommendation itself.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub item: RecommendationItem,
    /// Feedback recorded by the user, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_feedback: Option<Feedback>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Feedback::Helpful)]
    #[case(Feedback::NotHelpful)]
    #[case(Feedback::Saved)]
    fn feedback_tags_parse_back(#[case] feedback: Feedback) {
        assert_eq!(feedback.as_str().parse::<Feedback>(), Ok(feedback));
    }

    #[rstest]
    fn rejects_unknown_feedback() {
        let err = "Helpful".parse::<Feedback>().expect_err("case-sensitive");
        assert_eq!(err.value, "Helpful");
    }

    #[rstest]
    fn rows_default_to_accepting_clients() {
        let mut record = TherapistLocationRecord::default();
        record.profile.verified = true;
        let row = TherapistRow::from(record);
        assert!(row.is_listed());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialised_rows_default_to_accepting_clients() {
        let row: TherapistRow =
            serde_json::from_str(r#"{"id": "t-1", "verified": true, "latitude": 1.5}"#)
                .expect("deserialise row");
        assert!(row.is_accepting_clients);
        assert_eq!(row.record.latitude, Some(1.5));
    }
}
