//! Parsing untrusted text-generation replies into recommendation items.
//!
//! Replies are expected to contain a JSON array of drafts, possibly wrapped
//! in prose or a Markdown fence. Everything between the first `[` and the
//! last `]` is decoded; entries that do not look like drafts are dropped
//! rather than failing the whole reply.

use serde::Deserialize;
use serde_json::Value;
use solace_core::{Category, CategoryTag, RecommendationItem, SourceError};

use super::LlmKind;
use crate::http::encode_component;

/// Score used when a draft omits one or supplies something unusable.
pub const DEFAULT_DRAFT_SCORE: i32 = 5;
const MIN_SCORE: i64 = 1;
const MAX_SCORE: i64 = 10;

/// Return the slice from the first `[` to the last `]`, inclusive.
#[must_use]
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Decode the JSON array embedded in `reply` into raw entries.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when no array is present or it is not
/// valid JSON.
pub fn parse_json_entries(reply: &str) -> Result<Vec<Value>, SourceError> {
    let array = extract_json_array(reply).ok_or_else(|| SourceError::Parse {
        message: "reply contained no JSON array".to_owned(),
    })?;
    serde_json::from_str(array).map_err(|err| SourceError::Parse {
        message: err.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct Draft {
    #[serde(default, rename = "type")]
    category: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "ai_reasoning")]
    rationale: String,
    #[serde(default)]
    relevance_score: Option<Value>,
    #[serde(default)]
    search_query: Option<String>,
}

/// Parse a reply for `kind` into recommendation items.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the reply holds no decodable array.
pub fn parse_recommendations(
    kind: LlmKind,
    reply: &str,
) -> Result<Vec<RecommendationItem>, SourceError> {
    let entries = parse_json_entries(reply)?;
    let total = entries.len();
    let items: Vec<_> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<Draft>(entry).ok())
        .filter(|draft| !draft.title.trim().is_empty())
        .map(|draft| draft_to_item(kind, draft))
        .collect();
    if items.len() < total {
        log::debug!(
            "dropped {} malformed {} drafts",
            total.saturating_sub(items.len()),
            kind.as_str()
        );
    }
    Ok(items)
}

fn draft_to_item(kind: LlmKind, draft: Draft) -> RecommendationItem {
    let category = draft
        .category
        .map_or_else(|| CategoryTag::from(kind.default_category()), CategoryTag::from);
    let query = draft
        .search_query
        .filter(|query| !query.trim().is_empty())
        .unwrap_or_else(|| draft.title.clone());
    let url = search_url(kind, category.category(), &query);
    RecommendationItem::new(
        category,
        draft.title,
        draft.description,
        draft.rationale,
        clamp_score(draft.relevance_score.as_ref()),
    )
    .with_external_url(url)
}

/// Clamp an untrusted score into `1..=10`.
///
/// Integers and integer strings are accepted; anything else yields
/// [`DEFAULT_DRAFT_SCORE`].
#[must_use]
pub fn clamp_score(value: Option<&Value>) -> i32 {
    let parsed = value.and_then(|score| match score {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    });
    parsed
        .map(|score| score.clamp(MIN_SCORE, MAX_SCORE))
        .and_then(|score| i32::try_from(score).ok())
        .unwrap_or(DEFAULT_DRAFT_SCORE)
}

/// Build the external search link for a draft.
#[must_use]
pub fn search_url(kind: LlmKind, category: Option<Category>, query: &str) -> String {
    let encoded = encode_component(query);
    match kind {
        LlmKind::Music => format!("https://open.spotify.com/search/{encoded}"),
        LlmKind::Places => format!("https://www.google.com/maps/search/?api=1&query={encoded}"),
        LlmKind::BooksAndActivities if category == Some(Category::Book) => {
            format!("https://www.amazon.com/s?k={encoded}&i=stripbooks")
        }
        LlmKind::BooksAndActivities => {
            format!("https://www.youtube.com/results?search_query={encoded}")
        }
    }
}
