//! Behavioural tests for [`RecommendationPipeline`].
//!
//! Sources are stubbed so the scenarios run without network access.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use solace_core::test_support::{MemoryStore, StubSource, StubTextGenerator};
use solace_core::{
    Category, RecommendationItem, RecommendationRequest, RecommendationStore, SourceError,
    StoredRecommendation, builtin_fallback,
};
use solace_data::{Generation, LlmKind, LlmRecommendationSource, Provenance, RecommendationPipeline};

const USER: &str = "user-1";

#[derive(Debug, Default)]
struct PipelineWorld {
    music: RefCell<Option<StubSource>>,
    music_fallback: RefCell<Option<StubSource>>,
    places: RefCell<Option<StubSource>>,
    generator: RefCell<Option<StubTextGenerator>>,
    store: MemoryStore,
    older_ids: RefCell<Vec<i64>>,
    generation: RefCell<Option<Generation>>,
    stored: RefCell<Vec<StoredRecommendation>>,
}

impl PipelineWorld {
    fn pipeline(&self) -> RecommendationPipeline {
        let music = self
            .music
            .take()
            .unwrap_or_else(|| StubSource::with_items("spotify", Vec::new()));
        let places = self
            .places
            .take()
            .unwrap_or_else(|| StubSource::with_items("foursquare", Vec::new()));
        let generator = self
            .generator
            .take()
            .unwrap_or_else(|| StubTextGenerator::with_reply("[]"));
        let pipeline = RecommendationPipeline::new(
            music,
            places,
            LlmRecommendationSource::new(generator, LlmKind::BooksAndActivities),
        );
        if let Some(fallback) = self.music_fallback.take() {
            return pipeline.with_music_fallback(fallback);
        }
        pipeline
    }

    fn with_generation<R>(&self, inspect: impl FnOnce(&Generation) -> R) -> R {
        let generation = self.generation.borrow();
        inspect(generation.as_ref().expect("recommendations should be generated"))
    }
}

#[fixture]
fn world() -> PipelineWorld {
    PipelineWorld::default()
}

fn unreachable(name: &str) -> SourceError {
    SourceError::Network {
        url: format!("https://{name}.invalid"),
        message: "connection refused".to_owned(),
    }
}

fn music(title: &str) -> RecommendationItem {
    RecommendationItem::new(Category::Music, title, "Album • 3:30", "Calming music to help you relax", 9)
}

const BOOK_AND_ACTIVITY: &str = r#"[
  {"type": "book", "title": "Feeling Good by David Burns", "description": "CBT classic",
   "ai_reasoning": "Reframes negative thoughts", "relevance_score": 9,
   "search_query": "Feeling Good David Burns"},
  {"type": "activity", "title": "Guided body scan", "description": "Ten minutes",
   "ai_reasoning": "Lowers stress", "relevance_score": 8,
   "search_query": "guided body scan meditation"}
]"#;

// --- Given steps ---

#[given("a music catalogue returning two tracks")]
fn given_music(world: &PipelineWorld) {
    world.music.replace(Some(StubSource::with_items(
        "spotify",
        vec![music("Weightless by Marconi Union"), music("Clair de Lune by Claude Debussy")],
    )));
}

#[given("a music catalogue that is unreachable")]
fn given_music_down(world: &PipelineWorld) {
    world
        .music
        .replace(Some(StubSource::with_error("spotify", unreachable("spotify"))));
}

#[given("a music fallback suggesting one song")]
fn given_music_fallback(world: &PipelineWorld) {
    world.music_fallback.replace(Some(StubSource::with_items(
        "llm-music",
        vec![music("Holocene by Bon Iver")],
    )));
}

#[given("a places catalogue returning one place")]
fn given_places(world: &PipelineWorld) {
    let park = RecommendationItem::new(
        Category::Place,
        "Golden Gate Park",
        "501 Stanyan St • Park",
        "A peaceful place to visit for mental wellness",
        8,
    );
    world
        .places
        .replace(Some(StubSource::with_items("foursquare", vec![park])));
}

#[given("a places catalogue that is unreachable")]
fn given_places_down(world: &PipelineWorld) {
    world
        .places
        .replace(Some(StubSource::with_error("foursquare", unreachable("foursquare"))));
}

#[given("a text generator suggesting a book and an activity")]
fn given_generator(world: &PipelineWorld) {
    world
        .generator
        .replace(Some(StubTextGenerator::with_reply(BOOK_AND_ACTIVITY)));
}

#[given("a text generator that is unreachable")]
fn given_generator_down(world: &PipelineWorld) {
    world
        .generator
        .replace(Some(StubTextGenerator::with_error(unreachable("openai"))));
}

#[given("a text generator replying with prose")]
fn given_generator_prose(world: &PipelineWorld) {
    world.generator.replace(Some(StubTextGenerator::with_reply(
        "I'm sorry, I can't produce recommendations right now.",
    )));
}

#[given("a store holding an older set for the user")]
fn given_older_set(world: &PipelineWorld) {
    let older = world
        .store
        .replace_for_user(USER, &[music("Old song"), music("Older song")])
        .expect("memory store is infallible");
    world
        .older_ids
        .replace(older.iter().map(|row| row.id).collect());
}

// --- When steps ---

#[when("recommendations are generated")]
fn when_generated(world: &PipelineWorld) {
    let generation = world.pipeline().generate(&RecommendationRequest::default());
    world.generation.replace(Some(generation));
}

#[when("recommendations are generated and stored")]
fn when_generated_and_stored(world: &PipelineWorld) {
    let result = world
        .pipeline()
        .generate_and_store(&world.store, USER, &RecommendationRequest::default())
        .expect("memory store is infallible");
    world.stored.replace(result.stored);
    world.generation.replace(Some(result.generation));
}

// --- Then steps ---

#[then("the set contains {count} items")]
fn then_count(world: &PipelineWorld, count: usize) {
    world.with_generation(|generation| assert_eq!(generation.items.len(), count));
}

#[then("music came from {name}")]
fn then_music_from(world: &PipelineWorld, name: String) {
    world.with_generation(|generation| {
        let expected = if name.starts_with("llm-") {
            Provenance::Fallback(name.clone())
        } else {
            Provenance::Primary(name.clone())
        };
        assert_eq!(generation.music.provenance, expected);
    });
}

#[then("places came from {name}")]
fn then_places_from(world: &PipelineWorld, name: String) {
    world.with_generation(|generation| {
        assert_eq!(generation.places.provenance, Provenance::Primary(name.clone()));
    });
}

#[then("nothing was backfilled")]
fn then_no_backfill(world: &PipelineWorld) {
    world.with_generation(|generation| assert!(generation.backfilled.is_empty()));
}

#[then("every required category was backfilled")]
fn then_all_backfilled(world: &PipelineWorld) {
    world.with_generation(|generation| {
        assert_eq!(generation.backfilled, Category::REQUIRED.to_vec());
        assert_eq!(generation.music.provenance, Provenance::Empty);
        assert_eq!(generation.places.provenance, Provenance::Empty);
        assert_eq!(generation.books_and_activities.provenance, Provenance::Empty);
    });
}

#[then("the items are the built-in fallbacks")]
fn then_builtin(world: &PipelineWorld) {
    let expected: Vec<_> = Category::REQUIRED
        .into_iter()
        .map(|category| builtin_fallback(category).into_item(category))
        .collect();
    world.with_generation(|generation| assert_eq!(generation.items, expected));
}

#[then("book and activity were backfilled")]
fn then_books_backfilled(world: &PipelineWorld) {
    world.with_generation(|generation| {
        assert_eq!(generation.backfilled, vec![Category::Book, Category::Activity]);
        assert_eq!(generation.books_and_activities.count, 0);
    });
}

#[then("the store holds {count} items for the user")]
fn then_store_count(world: &PipelineWorld, count: usize) {
    let rows = world
        .store
        .recommendations_for(USER)
        .expect("memory store is infallible");
    assert_eq!(rows.len(), count);
    assert_eq!(*world.stored.borrow(), rows);
}

#[then("the stored ids are new")]
fn then_new_ids(world: &PipelineWorld) {
    let older = world.older_ids.borrow();
    assert!(
        world
            .stored
            .borrow()
            .iter()
            .all(|row| !older.contains(&row.id))
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/pipeline.feature", name = $title)]
        fn $fn_name(world: PipelineWorld) {
            let _ = world;
        }
    };
}

register_scenario!(every_source_delivers, "every source delivers");
register_scenario!(
    music_falls_back,
    "a failing music catalogue falls back to generated music"
);
register_scenario!(every_source_fails, "every source fails");
register_scenario!(unparsable_reply, "an unparsable reply is backfilled");
register_scenario!(replaces_stored_set, "generation replaces the stored set");
