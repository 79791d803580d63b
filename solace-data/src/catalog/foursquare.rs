//! Place recommendations from the Foursquare Places API.

use serde::Deserialize;
use solace_core::{
    Category, RecommendationItem, RecommendationRequest, RecommendationSource, SourceError,
};

use super::CATALOG_LIMIT;
use crate::http::{ClientBuildError, HttpClientConfig, HttpRuntime, encode_component};

/// Default Places API base URL.
pub const DEFAULT_FOURSQUARE_BASE_URL: &str = "https://api.foursquare.com/v3";

/// Default area searched when the caller does not name one.
pub const DEFAULT_NEAR: &str = "San Francisco, CA";

/// Default search terms.
pub const DEFAULT_PLACES_QUERY: &str = "wellness meditation yoga spa park";

const SOURCE_NAME: &str = "foursquare";
const PLACE_SCORE: i32 = 8;
const PLACE_RATIONALE: &str = "A peaceful place to visit for mental wellness";
const UNKNOWN_LOCATION: &str = "Location";
const UNKNOWN_CATEGORY: &str = "Wellness spot";
const MAPS_SEARCH: &str = "https://www.google.com/maps/search/?api=1";

/// Configuration for [`FoursquareSource`].
#[derive(Clone, PartialEq, Eq)]
pub struct FoursquareConfig {
    /// API key sent verbatim in the `Authorization` header.
    pub api_key: Option<String>,
    /// Places API base URL, without a trailing slash.
    pub base_url: String,
    /// Area to search around.
    pub near: String,
    /// Search terms.
    pub query: String,
    /// Shared HTTP settings.
    pub http: HttpClientConfig,
}

impl Default for FoursquareConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_FOURSQUARE_BASE_URL.to_owned(),
            near: DEFAULT_NEAR.to_owned(),
            query: DEFAULT_PLACES_QUERY.to_owned(),
            http: HttpClientConfig::default(),
        }
    }
}

impl std::fmt::Debug for FoursquareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoursquareConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("near", &self.near)
            .field("query", &self.query)
            .field("http", &self.http)
            .finish()
    }
}

impl FoursquareConfig {
    /// Configuration using the public endpoint and default search.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Search around `near` instead of the default area.
    #[must_use]
    pub fn with_near(mut self, near: impl Into<String>) -> Self {
        self.near = near.into();
        self
    }
}

/// Recommendation source backed by the Foursquare Places API.
#[derive(Debug)]
pub struct FoursquareSource {
    config: FoursquareConfig,
    http: HttpRuntime,
}

impl FoursquareSource {
    /// Build the source and its HTTP runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the HTTP client or Tokio runtime
    /// cannot be created.
    pub fn new(config: FoursquareConfig) -> Result<Self, ClientBuildError> {
        let http = HttpRuntime::new(&config.http)?;
        Ok(Self { config, http })
    }

    async fn search(&self, api_key: &str) -> Result<Vec<RecommendationItem>, SourceError> {
        let url = format!(
            "{}/places/search",
            self.config.base_url.trim_end_matches('/')
        );
        let limit = CATALOG_LIMIT.to_string();
        let request = self
            .http
            .client()
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("query", self.config.query.as_str()),
                ("near", self.config.near.as_str()),
                ("limit", limit.as_str()),
            ]);
        let response: SearchResponse = self.http.send_json(request, &url).await?;
        log::debug!("foursquare returned {} places", response.results.len());
        Ok(response
            .results
            .into_iter()
            .take(CATALOG_LIMIT)
            .map(place_to_item)
            .collect())
    }
}

impl RecommendationSource for FoursquareSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn fetch(&self, _: &RecommendationRequest) -> Result<Vec<RecommendationItem>, SourceError> {
        let api_key =
            self.config
                .api_key
                .as_deref()
                .ok_or_else(|| SourceError::MissingCredentials {
                    source_name: "Foursquare".to_owned(),
                })?;
        self.http.block_on(self.search(api_key))
    }
}

fn place_to_item(place: Place) -> RecommendationItem {
    let locale = place
        .location
        .as_ref()
        .and_then(|location| {
            non_empty(location.address.as_deref())
                .or_else(|| non_empty(location.locality.as_deref()))
        })
        .unwrap_or(UNKNOWN_LOCATION);
    let kind = place
        .categories
        .first()
        .and_then(|category| non_empty(Some(category.name.as_str())))
        .unwrap_or(UNKNOWN_CATEGORY);
    let description = format!("{locale} • {kind}");
    let coordinates = place
        .geocodes
        .as_ref()
        .and_then(|geocodes| geocodes.main.as_ref());
    let url = maps_url(&place.name, coordinates);
    RecommendationItem::new(
        Category::Place,
        place.name,
        description,
        PLACE_RATIONALE,
        PLACE_SCORE,
    )
    .with_external_url(url)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

/// Google Maps link pinned to the coordinates when they are known.
fn maps_url(name: &str, coordinates: Option<&LatLng>) -> String {
    let encoded = encode_component(name);
    match coordinates {
        Some(LatLng {
            latitude,
            longitude,
        }) => format!("{MAPS_SEARCH}&query={latitude},{longitude}&query_place_id={encoded}"),
        None => format!("{MAPS_SEARCH}&query={encoded}"),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    #[serde(default)]
    location: Option<PlaceLocation>,
    #[serde(default)]
    categories: Vec<PlaceCategory>,
    #[serde(default)]
    geocodes: Option<Geocodes>,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    address: Option<String>,
    locality: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceCategory {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Geocodes {
    main: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}
