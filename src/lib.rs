//! Facade crate for the Solace wellness recommendation engine.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use solace_core::{
    Category, CategoryTag, EARTH_RADIUS_KM, FallbackContent, FallbackOverrides, Feedback,
    GeoPoint, GeoPointError, Geolocated, InvalidFeedback, MoodLog, MoodSummary, MusicMood,
    NEARBY_LIMIT, NearbyQuery, NearbyQueryError, NearestRanker, OnboardingAnswers, Prompt, Ranked,
    RankedTherapist, RecommendationItem, RecommendationRequest, RecommendationSource,
    RecommendationStore, SourceError, StoredRecommendation, TextGenerator, TherapistDirectory,
    TherapistLocationRecord, TherapistProfile, TherapistRow, UnknownCategory, builtin_fallback,
    ensure_coverage, format_distance, haversine_km, missing_categories, rank_nearest,
};

#[cfg(feature = "store-sqlite")]
pub use solace_core::{SqliteStore, SqliteStoreError};

#[cfg(feature = "test-support")]
pub use solace_core::test_support;
