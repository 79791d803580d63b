//! Music recommendations from the Spotify Web API.
//!
//! [`SpotifySource`] exchanges client credentials for an access token, then
//! asks the `recommendations` endpoint for tracks seeded by the requester's
//! mood and energy.

use serde::Deserialize;
use solace_core::{
    Category, MoodSummary, MusicMood, RecommendationItem, RecommendationRequest,
    RecommendationSource, SourceError,
};

use super::CATALOG_LIMIT;
use crate::http::{ClientBuildError, HttpClientConfig, HttpRuntime};

/// Default token endpoint.
pub const DEFAULT_SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";

/// Default Web API base URL.
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

const SOURCE_NAME: &str = "spotify";
const CALM_GENRES: &str = "ambient,chill";
const UPLIFTING_GENRES: &str = "pop,happy";
const MIN_TARGET_ENERGY: f64 = 0.3;
const TRACK_SCORE: i32 = 9;
const CALM_RATIONALE: &str = "Calming music to help you relax";
const UPLIFTING_RATIONALE: &str = "Uplifting music to boost your mood";

/// Client-credentials pair issued by Spotify.
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    /// Application client id.
    pub client_id: String,
    /// Application client secret.
    pub client_secret: String,
}

impl SpotifyCredentials {
    /// Pair a client id with its secret.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration for [`SpotifySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    /// Credentials; when absent every fetch fails with
    /// [`SourceError::MissingCredentials`].
    pub credentials: Option<SpotifyCredentials>,
    /// Token endpoint URL.
    pub accounts_url: String,
    /// Web API base URL, without a trailing slash.
    pub api_base: String,
    /// Shared HTTP settings.
    pub http: HttpClientConfig,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            accounts_url: DEFAULT_SPOTIFY_ACCOUNTS_URL.to_owned(),
            api_base: DEFAULT_SPOTIFY_API_BASE.to_owned(),
            http: HttpClientConfig::default(),
        }
    }
}

impl SpotifyConfig {
    /// Configuration using the public Spotify endpoints.
    #[must_use]
    pub fn new(credentials: Option<SpotifyCredentials>) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }
}

/// Recommendation source backed by the Spotify Web API.
#[derive(Debug)]
pub struct SpotifySource {
    config: SpotifyConfig,
    http: HttpRuntime,
}

impl SpotifySource {
    /// Build the source and its HTTP runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the HTTP client or Tokio runtime
    /// cannot be created.
    pub fn new(config: SpotifyConfig) -> Result<Self, ClientBuildError> {
        let http = HttpRuntime::new(&config.http)?;
        Ok(Self { config, http })
    }

    async fn access_token(&self, credentials: &SpotifyCredentials) -> Result<String, SourceError> {
        let url = self.config.accounts_url.as_str();
        let request = self
            .http
            .client()
            .post(url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")]);
        let token: TokenResponse = self.http.send_json(request, url).await?;
        Ok(token.access_token)
    }

    async fn fetch_tracks(
        &self,
        credentials: &SpotifyCredentials,
        summary: &MoodSummary,
    ) -> Result<Vec<RecommendationItem>, SourceError> {
        let token = self.access_token(credentials).await?;
        let url = format!(
            "{}/recommendations",
            self.config.api_base.trim_end_matches('/')
        );
        let request = self
            .http
            .client()
            .get(&url)
            .bearer_auth(token)
            .query(&recommendation_query(summary));
        let response: RecommendationsResponse = self.http.send_json(request, &url).await?;
        log::debug!("spotify returned {} tracks", response.tracks.len());
        Ok(tracks_to_items(response.tracks, summary))
    }
}

impl RecommendationSource for SpotifySource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn fetch(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, SourceError> {
        let credentials =
            self.config
                .credentials
                .as_ref()
                .ok_or_else(|| SourceError::MissingCredentials {
                    source_name: "Spotify".to_owned(),
                })?;
        self.http
            .block_on(self.fetch_tracks(credentials, &request.summary))
    }
}

/// Query parameters for the `recommendations` endpoint.
#[expect(
    clippy::float_arithmetic,
    reason = "targets are the average energy scaled into 0..=1"
)]
fn recommendation_query(summary: &MoodSummary) -> Vec<(&'static str, String)> {
    let seeds = if summary.music_mood() == MusicMood::Calm || summary.is_low_energy() {
        CALM_GENRES
    } else {
        UPLIFTING_GENRES
    };
    let scaled = summary.energy / 10.0;
    vec![
        ("seed_genres", seeds.to_owned()),
        ("target_valence", format!("{scaled:.2}")),
        ("target_energy", format!("{:.2}", scaled.max(MIN_TARGET_ENERGY))),
        ("limit", CATALOG_LIMIT.to_string()),
    ]
}

fn tracks_to_items(tracks: Vec<Track>, summary: &MoodSummary) -> Vec<RecommendationItem> {
    let rationale = if summary.is_low_energy() {
        CALM_RATIONALE
    } else {
        UPLIFTING_RATIONALE
    };
    tracks
        .into_iter()
        .filter_map(|track| track_to_item(track, rationale))
        .take(CATALOG_LIMIT)
        .collect()
}

/// Tracks without an artist are skipped.
fn track_to_item(track: Track, rationale: &str) -> Option<RecommendationItem> {
    let Track {
        name,
        artists,
        album,
        duration_ms,
        external_urls,
    } = track;
    let artist = artists.into_iter().next()?;
    let description = format!("{} • {}", album.name, format_duration(duration_ms));
    let mut item = RecommendationItem::new(
        Category::Music,
        format!("{name} by {}", artist.name),
        description,
        rationale,
        TRACK_SCORE,
    );
    if let Some(url) = external_urls.spotify {
        item = item.with_external_url(url);
    }
    if let Some(image) = album.images.into_iter().next() {
        item = item.with_image_url(image.url);
    }
    Some(item)
}

/// Render milliseconds as `m:ss`.
fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms.div_euclid(1000);
    let minutes = total_secs.div_euclid(60);
    let seconds = total_secs.rem_euclid(60);
    format!("{minutes}:{seconds:02}")
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Album,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    name: String,
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}
