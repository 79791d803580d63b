//! Recommendation generation pipeline.
//!
//! The pipeline runs three streams concurrently on scoped threads: music,
//! places, and books and activities. Music and places each have a primary
//! source and an optional fallback that runs only when the primary fails or
//! comes back empty. A failing or panicking source never fails the pipeline;
//! its stream is simply empty and coverage backfill supplies the missing
//! categories. Items keep the stream order regardless of completion order.

use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};

use solace_core::{
    Category, FallbackOverrides, RecommendationItem, RecommendationRequest, RecommendationSource,
    RecommendationStore, StoredRecommendation, ensure_coverage, missing_categories,
};

use crate::catalog::{FoursquareConfig, FoursquareSource, SpotifyConfig, SpotifySource};
use crate::http::ClientBuildError;
use crate::llm::{LlmKind, LlmRecommendationSource, OpenAiConfig, OpenAiTextGenerator};

/// Which provider supplied a stream's items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// The primary source, by name.
    Primary(String),
    /// The fallback source, by name.
    Fallback(String),
    /// No source produced anything.
    Empty,
}

/// Outcome of one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
    /// Provider of the stream's items.
    pub provenance: Provenance,
    /// Number of items the stream contributed.
    pub count: usize,
}

impl StreamReport {
    const fn empty() -> Self {
        Self {
            provenance: Provenance::Empty,
            count: 0,
        }
    }
}

/// Result of [`RecommendationPipeline::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Music, places, then books and activities, followed by any fallbacks.
    pub items: Vec<RecommendationItem>,
    /// Music stream outcome.
    pub music: StreamReport,
    /// Places stream outcome.
    pub places: StreamReport,
    /// Books and activities stream outcome.
    pub books_and_activities: StreamReport,
    /// Categories filled by coverage backfill, in required order.
    pub backfilled: Vec<Category>,
}

/// A generation together with the rows it replaced the user's set with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGeneration {
    /// What the pipeline produced.
    pub generation: Generation,
    /// The persisted rows.
    pub stored: Vec<StoredRecommendation>,
}

type BoxedSource = Box<dyn RecommendationSource>;

/// Runs the recommendation sources and guarantees category coverage.
pub struct RecommendationPipeline {
    music: BoxedSource,
    music_fallback: Option<BoxedSource>,
    places: BoxedSource,
    places_fallback: Option<BoxedSource>,
    books_and_activities: BoxedSource,
    overrides: FallbackOverrides,
}

impl std::fmt::Debug for RecommendationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationPipeline")
            .field("music", &self.music.name())
            .field(
                "music_fallback",
                &self.music_fallback.as_ref().map(|source| source.name()),
            )
            .field("places", &self.places.name())
            .field(
                "places_fallback",
                &self.places_fallback.as_ref().map(|source| source.name()),
            )
            .field("books_and_activities", &self.books_and_activities.name())
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl RecommendationPipeline {
    /// Pipeline with the given primary sources and no fallbacks.
    #[must_use]
    pub fn new(
        music: impl RecommendationSource + 'static,
        places: impl RecommendationSource + 'static,
        books_and_activities: impl RecommendationSource + 'static,
    ) -> Self {
        Self {
            music: Box::new(music),
            music_fallback: None,
            places: Box::new(places),
            places_fallback: None,
            books_and_activities: Box::new(books_and_activities),
            overrides: FallbackOverrides::new(),
        }
    }

    /// Assemble the production pipeline.
    ///
    /// Spotify and Foursquare are the primary music and places sources; one
    /// shared OpenAI generator backs their fallbacks and the books and
    /// activities stream.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when any HTTP client cannot be built.
    pub fn from_providers(
        spotify: SpotifyConfig,
        foursquare: FoursquareConfig,
        openai: OpenAiConfig,
    ) -> Result<Self, ClientBuildError> {
        let generator = Arc::new(OpenAiTextGenerator::new(openai)?);
        let pipeline = Self::new(
            SpotifySource::new(spotify)?,
            FoursquareSource::new(foursquare)?,
            LlmRecommendationSource::new(Arc::clone(&generator), LlmKind::BooksAndActivities),
        )
        .with_music_fallback(LlmRecommendationSource::new(
            Arc::clone(&generator),
            LlmKind::Music,
        ))
        .with_places_fallback(LlmRecommendationSource::new(generator, LlmKind::Places));
        Ok(pipeline)
    }

    /// Use `source` when the music source fails or returns nothing.
    #[must_use]
    pub fn with_music_fallback(mut self, source: impl RecommendationSource + 'static) -> Self {
        self.music_fallback = Some(Box::new(source));
        self
    }

    /// Use `source` when the places source fails or returns nothing.
    #[must_use]
    pub fn with_places_fallback(mut self, source: impl RecommendationSource + 'static) -> Self {
        self.places_fallback = Some(Box::new(source));
        self
    }

    /// Backfill with `overrides` in preference to the built-in fallbacks.
    #[must_use]
    pub fn with_overrides(mut self, overrides: FallbackOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Run every stream and backfill missing categories.
    #[must_use]
    pub fn generate(&self, request: &RecommendationRequest) -> Generation {
        let ((mut items, music), (place_items, places), (other_items, books_and_activities)) =
            thread::scope(|scope| {
                let music = scope.spawn(|| {
                    run_stream(self.music.as_ref(), self.music_fallback.as_deref(), request)
                });
                let places = scope.spawn(|| {
                    run_stream(self.places.as_ref(), self.places_fallback.as_deref(), request)
                });
                let others = run_stream(self.books_and_activities.as_ref(), None, request);
                (
                    join_stream(music, self.music.name()),
                    join_stream(places, self.places.name()),
                    others,
                )
            });
        items.extend(place_items);
        items.extend(other_items);

        let backfilled = missing_categories(&items);
        if !backfilled.is_empty() {
            let names: Vec<_> = backfilled.iter().map(|category| category.as_str()).collect();
            log::info!("backfilling categories: {}", names.join(", "));
        }
        let items = ensure_coverage(items, &self.overrides);
        log::info!(
            "generated {} recommendations (music {}, places {}, books and activities {})",
            items.len(),
            music.count,
            places.count,
            books_and_activities.count
        );
        Generation {
            items,
            music,
            places,
            books_and_activities,
            backfilled,
        }
    }

    /// Generate, then replace `user_id`'s stored set with the result.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; source failures never fail the call.
    pub fn generate_and_store<S>(
        &self,
        store: &S,
        user_id: &str,
        request: &RecommendationRequest,
    ) -> Result<StoredGeneration, S::Error>
    where
        S: RecommendationStore + ?Sized,
    {
        let generation = self.generate(request);
        let stored = store.replace_for_user(user_id, &generation.items)?;
        Ok(StoredGeneration { generation, stored })
    }
}

type StreamOutcome = (Vec<RecommendationItem>, StreamReport);

/// Collect a stream thread's outcome; a panicked stream counts as empty.
fn join_stream(handle: ScopedJoinHandle<'_, StreamOutcome>, name: &str) -> StreamOutcome {
    handle.join().unwrap_or_else(|_| {
        log::error!("{name} stream panicked");
        (Vec::new(), StreamReport::empty())
    })
}

fn run_stream(
    primary: &dyn RecommendationSource,
    fallback: Option<&dyn RecommendationSource>,
    request: &RecommendationRequest,
) -> StreamOutcome {
    if let Some(items) = fetch_non_empty(primary, request) {
        let report = StreamReport {
            provenance: Provenance::Primary(primary.name().to_owned()),
            count: items.len(),
        };
        return (items, report);
    }
    let Some(fallback) = fallback else {
        return (Vec::new(), StreamReport::empty());
    };
    log::info!(
        "{} produced nothing; trying {}",
        primary.name(),
        fallback.name()
    );
    fetch_non_empty(fallback, request).map_or_else(
        || (Vec::new(), StreamReport::empty()),
        |items| {
            let report = StreamReport {
                provenance: Provenance::Fallback(fallback.name().to_owned()),
                count: items.len(),
            };
            (items, report)
        },
    )
}

/// Fetch from `source`, treating errors and empty results alike.
fn fetch_non_empty(
    source: &dyn RecommendationSource,
    request: &RecommendationRequest,
) -> Option<Vec<RecommendationItem>> {
    match source.fetch(request) {
        Ok(items) if items.is_empty() => {
            log::debug!("{} returned no items", source.name());
            None
        }
        Ok(items) => Some(items),
        Err(err) => {
            log::warn!("{} failed: {err}", source.name());
            None
        }
    }
}
