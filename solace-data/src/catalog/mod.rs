//! Catalogue-backed recommendation sources.
//!
//! Each source calls a third-party catalogue over HTTP and maps its results
//! onto [`solace_core::RecommendationItem`]s of a single category.

mod foursquare;
mod spotify;

pub use foursquare::{
    DEFAULT_FOURSQUARE_BASE_URL, DEFAULT_NEAR, DEFAULT_PLACES_QUERY, FoursquareConfig,
    FoursquareSource,
};
pub use spotify::{
    DEFAULT_SPOTIFY_ACCOUNTS_URL, DEFAULT_SPOTIFY_API_BASE, SpotifyConfig, SpotifyCredentials,
    SpotifySource,
};

/// Maximum number of items a catalogue source returns.
pub const CATALOG_LIMIT: usize = 5;
