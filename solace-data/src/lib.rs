//! Recommendation sources and generation for the Solace engine.
//!
//! Responsibilities:
//! - Implement [`solace_core::RecommendationSource`] over the Spotify and
//!   Foursquare catalogues and an OpenAI-compatible text generator.
//! - Parse untrusted text-generation replies into recommendation items and
//!   wellness goals.
//! - Run the generation pipeline: primary sources, fallbacks, coverage
//!   backfill and persistence.
//!
//! Boundaries:
//! - Do not encode domain rules (these live in `solace-core`).
//! - Never read the environment; callers pass credentials in explicitly.
//!
//! Invariants:
//! - Source failures degrade to empty streams and are logged, never raised
//!   out of the pipeline.
//! - No global mutable state.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod goals;
mod http;
pub mod llm;
pub mod pipeline;

pub use catalog::{
    FoursquareConfig, FoursquareSource, SpotifyConfig, SpotifyCredentials, SpotifySource,
};
pub use goals::{WellnessGoal, parse_goals, suggest_wellness_goals};
pub use http::{ClientBuildError, DEFAULT_USER_AGENT, HttpClientConfig};
pub use llm::{LlmKind, LlmRecommendationSource, OpenAiConfig, OpenAiTextGenerator};
pub use pipeline::{Generation, Provenance, RecommendationPipeline, StoredGeneration, StreamReport};
