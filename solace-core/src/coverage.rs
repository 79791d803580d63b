//! Guarantee that a recommendation set covers every required category.
//!
//! Upstream catalogue and text-generation calls fail or come back empty
//! regularly. [`ensure_coverage`] appends one deterministic fallback per
//! missing [`Category`] so every category always has at least one item.
//! Input items are never removed, reordered or modified.
//!
//! # Examples
//! ```
//! use solace_core::{Category, FallbackOverrides, RecommendationItem, ensure_coverage};
//!
//! let music = RecommendationItem::new(Category::Music, "Track", "Ambient", "Relaxing", 9);
//! let covered = ensure_coverage(vec![music.clone()], &FallbackOverrides::new());
//!
//! assert_eq!(covered.len(), 4);
//! assert_eq!(covered[0], music);
//! ```

use std::collections::{HashMap, HashSet};

use crate::{Category, RecommendationItem};

/// Recommendation content without a category.
///
/// Used for the built-in fallbacks and for caller overrides; the category is
/// supplied when the content is turned into an item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallbackContent {
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Why the item is suggested.
    #[cfg_attr(feature = "serde", serde(rename = "ai_reasoning"))]
    pub rationale: String,
    /// Relevance score.
    pub relevance_score: i32,
    /// Link to the external resource.
    #[cfg_attr(feature = "serde", serde(default))]
    pub external_url: Option<String>,
    /// Artwork or thumbnail URL.
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_url: Option<String>,
}

impl FallbackContent {
    /// Convert the content into an item tagged with `category`.
    #[must_use]
    pub fn into_item(self, category: Category) -> RecommendationItem {
        RecommendationItem {
            category: category.into(),
            title: self.title,
            description: self.description,
            rationale: self.rationale,
            relevance_score: self.relevance_score,
            external_url: self.external_url,
            image_url: self.image_url,
        }
    }
}

/// Caller-supplied fallback content keyed by category.
///
/// Categories without an override use [`builtin_fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FallbackOverrides {
    by_category: HashMap<Category, FallbackContent>,
}

impl FallbackOverrides {
    /// Construct an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the override for a category.
    pub fn set(&mut self, category: Category, content: FallbackContent) {
        self.by_category.insert(category, content);
    }

    /// Add an override while returning `self` for chaining.
    #[must_use]
    pub fn with_override(mut self, category: Category, content: FallbackContent) -> Self {
        self.set(category, content);
        self
    }

    /// Return the override for a category, if present.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<&FallbackContent> {
        self.by_category.get(&category)
    }

    /// Report whether no overrides are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

/// Return the curated fallback for a category.
#[must_use]
pub fn builtin_fallback(category: Category) -> FallbackContent {
    let (title, description, rationale, relevance_score, url) = match category {
        Category::Music => (
            "Weightless by Marconi Union",
            "Ambient • Clinically shown to reduce stress and slow heart rate",
            "Helps you decompress when mood or energy feels low.",
            8,
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
        ),
        Category::Book => (
            "The Mindful Way Through Depression by Mark Williams",
            "Mindfulness workbook • Practical CBT and meditation exercises",
            "Builds a steady routine for processing challenging emotions.",
            8,
            "https://www.amazon.com/dp/1593851286",
        ),
        Category::Place => (
            "Golden Gate Park",
            "Urban park • Open green spaces ideal for grounding walks",
            "Offers restorative nature exposure without leaving the city.",
            7,
            "https://www.google.com/maps/search/?api=1&query=Golden+Gate+Park",
        ),
        Category::Activity => (
            "10-minute guided breathwork",
            "Breathing practice • Calms the nervous system quickly",
            "Creates a quick reset ritual for high-stress moments.",
            7,
            "https://www.youtube.com/results?search_query=10+minute+guided+breathwork",
        ),
    };
    FallbackContent {
        title: title.to_owned(),
        description: description.to_owned(),
        rationale: rationale.to_owned(),
        relevance_score,
        external_url: Some(url.to_owned()),
        image_url: None,
    }
}

/// Return the required categories not covered by `items`, in
/// [`Category::REQUIRED`] order.
///
/// Only exact, case-sensitive tags count; unrecognised tags cover nothing.
#[must_use]
pub fn missing_categories(items: &[RecommendationItem]) -> Vec<Category> {
    let present: HashSet<Category> = items
        .iter()
        .filter_map(RecommendationItem::category)
        .collect();
    Category::REQUIRED
        .into_iter()
        .filter(|category| !present.contains(category))
        .collect()
}

/// Append one fallback item for each required category missing from `items`.
///
/// The returned vector starts with `items` unchanged. The function never
/// fails; an empty input yields exactly the four fallbacks.
#[must_use]
pub fn ensure_coverage(
    items: Vec<RecommendationItem>,
    overrides: &FallbackOverrides,
) -> Vec<RecommendationItem> {
    let missing = missing_categories(&items);
    let mut covered = items;
    covered.reserve(missing.len());
    covered.extend(
        missing
            .into_iter()
            .map(|category| fallback_for(category, overrides).into_item(category)),
    );
    covered
}

fn fallback_for(category: Category, overrides: &FallbackOverrides) -> FallbackContent {
    overrides
        .get(category)
        .cloned()
        .unwrap_or_else(|| builtin_fallback(category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn item(tag: &str) -> RecommendationItem {
        RecommendationItem::new(tag, "Example", "Example description", "Because it helps.", 5)
            .with_external_url("https://example.com")
    }

    #[fixture]
    fn complete() -> Vec<RecommendationItem> {
        vec![item("music"), item("book"), item("place"), item("activity")]
    }

    #[rstest]
    fn complete_input_is_returned_unchanged(complete: Vec<RecommendationItem>) {
        let result = ensure_coverage(complete.clone(), &FallbackOverrides::new());
        assert_eq!(result, complete);
    }

    #[rstest]
    fn empty_input_yields_builtin_fallbacks() {
        let result = ensure_coverage(Vec::new(), &FallbackOverrides::new());
        let expected: Vec<_> = Category::REQUIRED
            .into_iter()
            .map(|category| builtin_fallback(category).into_item(category))
            .collect();
        assert_eq!(result, expected);
    }

    #[rstest]
    fn missing_categories_are_appended_in_required_order() {
        let result = ensure_coverage(vec![item("place")], &FallbackOverrides::new());
        let tags: Vec<_> = result.iter().map(|rec| rec.category.as_str()).collect();
        assert_eq!(tags, vec!["place", "music", "book", "activity"]);
    }

    #[rstest]
    fn case_mismatch_does_not_count_as_coverage() {
        let result = ensure_coverage(vec![item("Music")], &FallbackOverrides::new());
        assert_eq!(result.len(), 5);
        assert_eq!(result[0], item("Music"));
        assert_eq!(result[1].category(), Some(Category::Music));
    }

    #[rstest]
    fn duplicates_are_preserved() {
        let input = vec![item("music"), item("music")];
        let result = ensure_coverage(input.clone(), &FallbackOverrides::new());
        assert_eq!(&result[..2], input.as_slice());
        assert_eq!(result.len(), 5);
    }

    #[rstest]
    fn override_replaces_builtin_and_forces_category() {
        let custom = FallbackContent {
            title: "Custom Track".into(),
            description: "Tailored".into(),
            rationale: "Because custom is requested.".into(),
            relevance_score: 9,
            external_url: Some("https://example.com/custom-track".into()),
            image_url: None,
        };
        let overrides = FallbackOverrides::new().with_override(Category::Music, custom.clone());

        let result = ensure_coverage(Vec::new(), &overrides);

        assert_eq!(result[0], custom.into_item(Category::Music));
        assert_eq!(result[1], builtin_fallback(Category::Book).into_item(Category::Book));
    }

    #[rstest]
    fn override_is_ignored_when_category_present() {
        let overrides = FallbackOverrides::new().with_override(
            Category::Book,
            FallbackContent {
                title: "Unused".into(),
                description: String::new(),
                rationale: String::new(),
                relevance_score: 1,
                external_url: None,
                image_url: None,
            },
        );
        let result = ensure_coverage(vec![item("book")], &overrides);
        assert!(result.iter().all(|rec| rec.title != "Unused"));
    }

    #[rstest]
    fn reports_missing_categories(complete: Vec<RecommendationItem>) {
        assert!(missing_categories(&complete).is_empty());
        assert_eq!(
            missing_categories(&[item("music"), item("activity")]),
            vec![Category::Book, Category::Place]
        );
    }
}
