use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Letter;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many questions for a single quiz: {len}")]
    TooManyQuestions { len: usize },
}

/// Scored outcome of one question, fed into [`QuizSummary::tally`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub chosen: Option<Letter>,
    pub correct: Letter,
    pub flagged: bool,
}

/// Final score breakdown of a submitted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: u32,
    correct: u32,
    wrong: u32,
    attempted: u32,
    marked: u32,
}

impl QuizSummary {
    /// Tally scored answers.
    ///
    /// `attempted` counts answers with a letter; `wrong` is `attempted - correct`,
    /// so unanswered questions are neither correct nor wrong.
    ///
    /// # Errors
    ///
    /// Returns `QuizSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `QuizSummaryError::TooManyQuestions` if the count cannot fit in `u32`.
    pub fn tally(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        answers: &[ScoredAnswer],
    ) -> Result<Self, QuizSummaryError> {
        if completed_at < started_at {
            return Err(QuizSummaryError::InvalidTimeRange);
        }
        let total = u32::try_from(answers.len())
            .map_err(|_| QuizSummaryError::TooManyQuestions { len: answers.len() })?;

        let mut correct = 0_u32;
        let mut attempted = 0_u32;
        let mut marked = 0_u32;
        for answer in answers {
            if let Some(chosen) = answer.chosen {
                attempted += 1;
                if chosen == answer.correct {
                    correct += 1;
                }
            }
            if answer.flagged {
                marked += 1;
            }
        }

        Ok(Self {
            started_at,
            completed_at,
            total,
            correct,
            wrong: attempted - correct,
            attempted,
            marked,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    #[must_use]
    pub fn marked(&self) -> u32 {
        self.marked
    }
}
