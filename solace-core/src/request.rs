//! Inputs shared by every recommendation source.

use crate::MoodSummary;

/// Text used when the user listed no concerns.
pub const DEFAULT_CONCERNS: &str = "General wellness";
/// Text used when the user listed no goals.
pub const DEFAULT_GOALS: &str = "Overall wellbeing";

/// Answers collected by the onboarding questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct OnboardingAnswers {
    /// Areas the user wants help with.
    pub concerns: Vec<String>,
    /// What the user hopes to achieve.
    pub goals: Vec<String>,
}

impl OnboardingAnswers {
    /// Comma-separated concerns, or [`DEFAULT_CONCERNS`].
    #[must_use]
    pub fn concerns_text(&self) -> String {
        join_or(&self.concerns, DEFAULT_CONCERNS)
    }

    /// Comma-separated goals, or [`DEFAULT_GOALS`].
    #[must_use]
    pub fn goals_text(&self) -> String {
        join_or(&self.goals, DEFAULT_GOALS)
    }
}

fn join_or(values: &[String], default: &str) -> String {
    if values.is_empty() {
        default.to_owned()
    } else {
        values.join(", ")
    }
}

/// Everything a source needs to tailor its suggestions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationRequest {
    /// Averages over the user's recent mood logs.
    pub summary: MoodSummary,
    /// Questionnaire answers.
    pub onboarding: OnboardingAnswers,
}

impl RecommendationRequest {
    /// Bundle a mood summary with onboarding answers.
    #[must_use]
    pub const fn new(summary: MoodSummary, onboarding: OnboardingAnswers) -> Self {
        Self {
            summary,
            onboarding,
        }
    }
}
