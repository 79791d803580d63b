//! Wellness goal suggestions from recent mood logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use solace_core::{MoodLog, SourceError, TextGenerator};

use crate::llm::{parse::parse_json_entries, prompts::goals_prompt};

/// Maximum number of goals returned.
pub const MAX_GOALS: usize = 3;

/// Category used when a suggestion omits one.
pub const DEFAULT_GOAL_CATEGORY: &str = "other";

/// Frequency used when a suggestion omits one.
pub const DEFAULT_GOAL_FREQUENCY: &str = "Weekly";

/// A goal proposed by the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessGoal {
    /// Short goal title.
    pub title: String,
    /// What the goal involves.
    pub description: String,
    /// Lower-cased category such as `mindfulness` or `sleep`.
    pub category: String,
    /// How often to practise, e.g. `Daily`.
    pub frequency: String,
    /// Why the goal was suggested.
    #[serde(default, rename = "ai_reasoning", skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Suggest up to [`MAX_GOALS`] wellness goals from `logs`, newest first.
///
/// Returns an empty list when there are no logs or the generator fails;
/// failures are logged rather than surfaced.
pub fn suggest_wellness_goals<G>(generator: &G, logs: &[MoodLog]) -> Vec<WellnessGoal>
where
    G: TextGenerator + ?Sized,
{
    if logs.is_empty() {
        return Vec::new();
    }
    match request_goals(generator, logs) {
        Ok(goals) => goals,
        Err(err) => {
            log::warn!("wellness goal suggestion failed: {err}");
            Vec::new()
        }
    }
}

fn request_goals<G>(generator: &G, logs: &[MoodLog]) -> Result<Vec<WellnessGoal>, SourceError>
where
    G: TextGenerator + ?Sized,
{
    let reply = generator.generate(&goals_prompt(logs))?;
    parse_goals(&reply)
}

/// Parse a goal reply, keeping entries with a title and description.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the reply holds no decodable array.
pub fn parse_goals(reply: &str) -> Result<Vec<WellnessGoal>, SourceError> {
    Ok(parse_json_entries(reply)?
        .iter()
        .filter_map(goal_from_entry)
        .take(MAX_GOALS)
        .collect())
}

fn goal_from_entry(entry: &Value) -> Option<WellnessGoal> {
    let title = text_field(entry, "title")?;
    let description = text_field(entry, "description")?;
    Some(WellnessGoal {
        title,
        description,
        category: entry
            .get("category")
            .and_then(Value::as_str)
            .map_or_else(|| DEFAULT_GOAL_CATEGORY.to_owned(), str::to_lowercase),
        frequency: entry
            .get("frequency")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_GOAL_FREQUENCY)
            .to_owned(),
        rationale: entry
            .get("ai_reasoning")
            .and_then(Value::as_str)
            .map(str::to_owned),
    })
}

/// A non-empty string or number, rendered as text.
fn text_field(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
