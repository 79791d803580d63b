//! Core domain types for the Solace recommendation engine.
//!
//! Two pure components sit at the centre of the crate:
//!
//! - [`ensure_coverage`] guarantees a recommendation set holds at least one
//!   item per required [`Category`], appending deterministic fallbacks for
//!   whatever upstream sources failed to supply.
//! - [`NearestRanker`] orders geolocated records by haversine distance from
//!   an origin and keeps the closest few.
//!
//! Around them the crate defines the validated inputs those components
//! accept ([`GeoPoint`], [`NearbyQuery`], [`MoodSummary`]) and the traits
//! collaborators implement ([`RecommendationSource`], [`TextGenerator`],
//! [`TherapistDirectory`], [`RecommendationStore`]). With the
//! `store-sqlite` feature, [`SqliteStore`] implements both store traits.
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod category;
pub mod coverage;
mod distance;
mod location;
mod mood;
pub mod nearby;
mod recommendation;
mod request;
mod source;
pub mod store;
mod therapist;

#[doc(hidden)]
pub mod test_support;

pub use category::{Category, CategoryTag, UnknownCategory};
pub use coverage::{
    FallbackContent, FallbackOverrides, builtin_fallback, ensure_coverage, missing_categories,
};
pub use distance::format_distance;
pub use location::{EARTH_RADIUS_KM, GeoPoint, GeoPointError, haversine_km};
pub use mood::{MoodLog, MoodSummary, MusicMood, NEUTRAL_SCORE};
pub use nearby::{
    Geolocated, NEARBY_LIMIT, NearbyQuery, NearbyQueryError, NearestRanker, Ranked, rank_nearest,
};
pub use recommendation::RecommendationItem;
pub use request::{DEFAULT_CONCERNS, DEFAULT_GOALS, OnboardingAnswers, RecommendationRequest};
pub use source::{Prompt, RecommendationSource, SourceError, TextGenerator};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteStore, SqliteStoreError};
pub use store::{
    Feedback, InvalidFeedback, RecommendationStore, StoredRecommendation, TherapistDirectory,
    TherapistRow,
};
pub use therapist::{RankedTherapist, TherapistLocationRecord, TherapistProfile};
