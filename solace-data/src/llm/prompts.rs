//! Prompt construction for text-generation sources.

use solace_core::{MoodLog, Prompt, RecommendationRequest};

const RECOMMENDATION_TOKENS: u32 = 800;
const BOOKS_AND_ACTIVITIES_TOKENS: u32 = 1500;
const GOAL_TOKENS: u32 = 800;

/// Number of mood logs quoted in the goal prompt.
pub const GOAL_LOG_WINDOW: usize = 7;

const MUSIC_SYSTEM: &str = r#"You are a mental wellness assistant recommending music that supports mental health.
Reply with ONLY a JSON array shaped exactly like this:
[
  {
    "type": "music",
    "title": "Song Name by Artist Name",
    "description": "Genre • How the song helps",
    "ai_reasoning": "One sentence on why it helps",
    "relevance_score": 1-10,
    "search_query": "artist name song name"
  }
]

Only suggest songs and artists that really exist. Favour calming, uplifting or therapeutic music."#;

const PLACES_SYSTEM: &str = r#"You are a mental wellness assistant recommending places that support mental health.
Reply with ONLY a JSON array shaped exactly like this:
[
  {
    "type": "place",
    "title": "Place Name",
    "description": "Kind of place • How it helps",
    "ai_reasoning": "One sentence on why it helps",
    "relevance_score": 1-10,
    "search_query": "place name near me"
  }
]

Favour real, accessible places: parks, gardens, meditation centres, yoga studios, wellness spas and nature trails."#;

const BOOKS_AND_ACTIVITIES_SYSTEM: &str = r#"You are a mental wellness assistant recommending books and activities.
Reply with ONLY a JSON array shaped exactly like this:
[
  {
    "type": "book|activity",
    "title": "Name (include the author for books)",
    "description": "One or two sentences",
    "ai_reasoning": "One sentence on why it helps",
    "relevance_score": 1-10,
    "search_query": "Exact book title and author OR activity name"
  }
]

Books must be real titles by real authors (for example "The Anxiety and Phobia Workbook by Edmund Bourne").
Activities must be specific (for example "Guided meditation for anxiety")."#;

const GOALS_SYSTEM: &str = concat!(
    "You are a mental wellness coach. Suggest three actionable wellness goals grounded in CBT ",
    "and mindfulness practice. Goals must be realistic, measurable and suited to the user's ",
    "recent mood trends. Reply with ONLY a JSON array of objects: ",
    r#"[{"title":"...","description":"...","category":"mindfulness|exercise|sleep|nutrition|social|therapy|medication|other","frequency":"Daily"|"Weekly"|...,"ai_reasoning":"..."}]"#,
);

/// Prompt asking for five music suggestions.
#[must_use]
pub fn music_prompt(request: &RecommendationRequest) -> Prompt {
    let summary = &request.summary;
    let user = format!(
        "User profile:\n\
         - Mood: {:.1}/10 (1=very low, 10=very high)\n\
         - Energy: {:.1}/10 (1=very low, 10=very high)\n\
         - Concerns: {}\n\
         - Goals: {}\n\n\
         Suggest 5 music recommendations suited to their current state.",
        summary.mood,
        summary.energy,
        request.onboarding.concerns_text(),
        request.onboarding.goals_text(),
    );
    Prompt::new(MUSIC_SYSTEM, user, RECOMMENDATION_TOKENS)
}

/// Prompt asking for five place suggestions.
#[must_use]
pub fn places_prompt(request: &RecommendationRequest) -> Prompt {
    let user = format!(
        "User concerns: {}\nUser goals: {}\n\nSuggest 5 places that support mental wellness.",
        request.onboarding.concerns_text(),
        request.onboarding.goals_text(),
    );
    Prompt::new(PLACES_SYSTEM, user, RECOMMENDATION_TOKENS)
}

/// Prompt asking for five books and five activities.
#[must_use]
pub fn books_and_activities_prompt(request: &RecommendationRequest) -> Prompt {
    let summary = &request.summary;
    let user = format!(
        "User profile:\n\
         - Mood: {:.1}/10 (1=very low, 10=very high)\n\
         - Energy: {:.1}/10 (1=very low, 10=very high)\n\
         - Stress: {:.1}/10 (1=very low, 10=very high)\n\
         - Concerns: {}\n\
         - Goals: {}\n\n\
         Suggest:\n\
         - 5 real mental health books with their actual titles and authors\n\
         - 5 specific activities\n\n\
         Keep them realistic and personal to the user's state.",
        summary.mood,
        summary.energy,
        summary.stress,
        request.onboarding.concerns_text(),
        request.onboarding.goals_text(),
    );
    Prompt::new(BOOKS_AND_ACTIVITIES_SYSTEM, user, BOOKS_AND_ACTIVITIES_TOKENS)
}

/// Prompt asking for three wellness goals from the most recent logs.
///
/// `logs` are expected newest first; only the first [`GOAL_LOG_WINDOW`]
/// are quoted.
#[must_use]
pub fn goals_prompt(logs: &[MoodLog]) -> Prompt {
    let entries = logs
        .iter()
        .take(GOAL_LOG_WINDOW)
        .map(describe_log)
        .collect::<Vec<_>>()
        .join("\n");
    let user = format!(
        "Recent mood entries:\n{entries}\n\
         Suggest exactly 3 personalised goals. Keep frequencies short (for example \"Daily\", \"3x per week\")."
    );
    Prompt::new(GOALS_SYSTEM, user, GOAL_TOKENS)
}

fn describe_log(log: &MoodLog) -> String {
    let date = log
        .created_at
        .as_deref()
        .and_then(|stamp| stamp.split('T').next())
        .filter(|date| !date.is_empty())
        .unwrap_or("unknown");
    let mut line = format!(
        "Date: {date} | Mood: {}/10 | Energy: {}/10 | Stress: {}/10",
        log.mood_score, log.energy_level, log.stress_level
    );
    if let Some(notes) = log.notes.as_deref().filter(|notes| !notes.is_empty()) {
        line.push_str(" | Notes: ");
        line.push_str(notes);
    }
    line
}
