use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Time limit used when none (or a non-positive one) is configured.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;

/// Timing policy for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerMode {
    /// One countdown for the whole quiz; navigation is free.
    #[default]
    Overall,
    /// A fresh countdown per question; navigation is forward-only.
    PerQuestion,
}

impl TimerMode {
    /// Maps the "per question" switch onto a mode.
    #[must_use]
    pub fn from_switch(per_question: bool) -> Self {
        if per_question {
            Self::PerQuestion
        } else {
            Self::Overall
        }
    }

    #[must_use]
    pub fn is_per_question(self) -> bool {
        matches!(self, Self::PerQuestion)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Overall => f.write_str("Overall"),
            TimerMode::PerQuestion => f.write_str("Per Question"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("seed must be a whole number, got {raw:?}")]
    InvalidSeed { raw: String },
}

/// Validated setup parameters for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    seed: Option<u64>,
    time_limit_secs: u32,
    timer_mode: TimerMode,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            seed: None,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            timer_mode: TimerMode::Overall,
        }
    }
}

impl QuizSettings {
    /// Build settings from already-parsed values.
    ///
    /// A zero time limit falls back to [`DEFAULT_TIME_LIMIT_SECS`].
    #[must_use]
    pub fn new(seed: Option<u64>, time_limit_secs: u32, timer_mode: TimerMode) -> Self {
        let time_limit_secs = if time_limit_secs == 0 {
            DEFAULT_TIME_LIMIT_SECS
        } else {
            time_limit_secs
        };
        Self {
            seed,
            time_limit_secs,
            timer_mode,
        }
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn timer_mode(&self) -> TimerMode {
        self.timer_mode
    }
}

/// Raw, user-entered setup values.
#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub seed: Option<String>,
    pub time_limit: Option<String>,
    pub per_question: bool,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// A blank seed means "no seed". A missing, unparsable or non-positive
    /// time limit falls back to the default rather than failing.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidSeed` if a seed is present but not a number.
    pub fn validate(self) -> Result<QuizSettings, QuizSettingsError> {
        let seed = match normalize_optional(self.seed) {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| QuizSettingsError::InvalidSeed { raw })?,
            ),
            None => None,
        };

        let time_limit_secs = normalize_optional(self.time_limit)
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .and_then(|secs| u32::try_from(secs).ok())
            .unwrap_or(DEFAULT_TIME_LIMIT_SECS);

        Ok(QuizSettings::new(
            seed,
            time_limit_secs,
            TimerMode::from_switch(self.per_question),
        ))
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
