//! Recommendation items produced by catalogue and text-generation sources.

use crate::{Category, CategoryTag};

/// A single suggestion shown to a user.
///
/// Items are immutable once produced: upstream sources create them, the
/// coverage pass consumes them and the store persists them. The
/// `relevance_score` is kept exactly as supplied; the intended range is
/// `1..=10`.
///
/// Field names on the wire follow the stored rows (`type`, `ai_reasoning`).
///
/// # Examples
/// ```
/// use solace_core::{Category, RecommendationItem};
///
/// let item = RecommendationItem::new(
///     Category::Book,
///     "Feeling Good by David Burns",
///     "CBT classic",
///     "Practical tools for low mood.",
///     8,
/// )
/// .with_external_url("https://example.com/feeling-good");
///
/// assert_eq!(item.category(), Some(Category::Book));
/// assert_eq!(item.external_url.as_deref(), Some("https://example.com/feeling-good"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecommendationItem {
    /// Category tag; may be unrecognised.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub category: CategoryTag,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Short explanation of why the item was suggested.
    #[cfg_attr(feature = "serde", serde(rename = "ai_reasoning"))]
    pub rationale: String,
    /// Relevance score, nominally `1..=10`.
    pub relevance_score: i32,
    /// Link to the external resource.
    #[cfg_attr(feature = "serde", serde(default))]
    pub external_url: Option<String>,
    /// Artwork or thumbnail URL.
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_url: Option<String>,
}

impl RecommendationItem {
    /// Construct an item without links.
    #[must_use]
    pub fn new(
        category: impl Into<CategoryTag>,
        title: impl Into<String>,
        description: impl Into<String>,
        rationale: impl Into<String>,
        relevance_score: i32,
    ) -> Self {
        Self {
            category: category.into(),
            title: title.into(),
            description: description.into(),
            rationale: rationale.into(),
            relevance_score,
            external_url: None,
            image_url: None,
        }
    }

    /// Attach an external link.
    #[must_use]
    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }

    /// Attach an image link.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Return the required category this item covers, if any.
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        self.category.category()
    }
}
