//! Mood logs and their summary statistics.

/// Neutral value used for every metric when no logs exist.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// One self-reported mood check-in.
///
/// Scores are on a `1..=10` scale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoodLog {
    /// Overall mood.
    pub mood_score: u8,
    /// Energy level.
    pub energy_level: u8,
    /// Stress level.
    pub stress_level: u8,
    /// Free-form notes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub notes: Option<String>,
    /// Timestamp of the check-in as supplied by the client.
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_at: Option<String>,
}

impl MoodLog {
    /// Construct a log without notes.
    #[must_use]
    pub const fn new(mood_score: u8, energy_level: u8, stress_level: u8) -> Self {
        Self {
            mood_score,
            energy_level,
            stress_level,
            notes: None,
            created_at: None,
        }
    }
}

/// Musical direction derived from the average mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicMood {
    /// Slow, soothing material.
    Calm,
    /// Brighter, energetic material.
    Uplifting,
}

/// Averages over recent mood logs.
///
/// # Examples
/// ```
/// use solace_core::{MoodLog, MoodSummary, MusicMood};
///
/// let summary = MoodSummary::from_logs(&[MoodLog::new(3, 4, 8), MoodLog::new(5, 6, 6)]);
/// assert_eq!(summary.mood, 4.0);
/// assert_eq!(summary.music_mood(), MusicMood::Calm);
///
/// assert_eq!(MoodSummary::from_logs(&[]), MoodSummary::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodSummary {
    /// Average mood score.
    pub mood: f64,
    /// Average energy level.
    pub energy: f64,
    /// Average stress level.
    pub stress: f64,
}

impl Default for MoodSummary {
    fn default() -> Self {
        Self {
            mood: NEUTRAL_SCORE,
            energy: NEUTRAL_SCORE,
            stress: NEUTRAL_SCORE,
        }
    }
}

impl MoodSummary {
    /// Average each metric across `logs`; an empty slice yields
    /// [`NEUTRAL_SCORE`] for every metric.
    #[must_use]
    pub fn from_logs(logs: &[MoodLog]) -> Self {
        if logs.is_empty() {
            return Self::default();
        }
        Self {
            mood: average(logs, |log| log.mood_score),
            energy: average(logs, |log| log.energy_level),
            stress: average(logs, |log| log.stress_level),
        }
    }

    /// Choose the musical direction for the current mood.
    #[must_use]
    pub fn music_mood(&self) -> MusicMood {
        if self.mood < NEUTRAL_SCORE {
            MusicMood::Calm
        } else {
            MusicMood::Uplifting
        }
    }

    /// Report whether average energy is below the neutral midpoint.
    #[must_use]
    pub fn is_low_energy(&self) -> bool {
        self.energy < NEUTRAL_SCORE
    }
}

#[expect(clippy::float_arithmetic, reason = "averaging requires division")]
#[expect(clippy::cast_precision_loss, reason = "log counts are small")]
fn average(logs: &[MoodLog], metric: impl Fn(&MoodLog) -> u8) -> f64 {
    let total: f64 = logs.iter().map(|log| f64::from(metric(log))).sum();
    total / logs.len() as f64
}
