use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{Letter, Question, QuizSettings, QuizSummary, ScoredAnswer, TimerMode};

use super::progress::SessionProgress;
use crate::error::{NavAction, SessionError};

//
// ─── ANSWER SLOT ───────────────────────────────────────────────────────────────
//

/// Commit state of one question.
///
/// `Committed(None)` is a closed slot with no answer, produced by a
/// per-question timeout. It can never be committed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerSlot {
    #[default]
    Open,
    Committed(Option<Letter>),
}

impl AnswerSlot {
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(self, AnswerSlot::Committed(_))
    }

    /// The committed letter, if any.
    #[must_use]
    pub fn letter(self) -> Option<Letter> {
        match self {
            AnswerSlot::Committed(letter) => letter,
            AnswerSlot::Open => None,
        }
    }
}

/// Result of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The slot was open and now holds the given answer.
    Committed(Option<Letter>),
    /// The slot was already committed; nothing changed.
    AlreadyCommitted,
    /// The quiz is submitted; nothing changed.
    Submitted,
}

impl CommitOutcome {
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Mutable data of one quiz run.
///
/// Every mutator checks the session invariants before writing:
/// - `current` stays within `0..len`
/// - a slot is committed at most once
/// - `submitted` only ever goes from false to true, and freezes answers,
///   flags and the pending selection
/// - in per-question mode, before submission, `current` never decreases
pub struct SessionState {
    items: Vec<Question>,
    answers: Vec<AnswerSlot>,
    flags: Vec<bool>,
    current: usize,
    submitted: bool,
    timer_mode: TimerMode,
    time_limit_secs: u32,
    remaining_secs: u32,
    timer_active: bool,
    pending: Option<Letter>,
    started_at: DateTime<Utc>,
    summary: Option<QuizSummary>,
}

impl SessionState {
    /// Create a fresh session over `items`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `items` is empty.
    pub fn new(
        items: Vec<Question>,
        settings: &QuizSettings,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if items.is_empty() {
            return Err(SessionError::Empty);
        }
        let len = items.len();
        Ok(Self {
            items,
            answers: vec![AnswerSlot::Open; len],
            flags: vec![false; len],
            current: 0,
            submitted: false,
            timer_mode: settings.timer_mode(),
            time_limit_secs: settings.time_limit_secs(),
            remaining_secs: settings.time_limit_secs(),
            timer_active: false,
            pending: None,
            started_at,
            summary: None,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[Question] {
        &self.items
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.items[self.current]
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.items.len()
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<AnswerSlot> {
        self.answers.get(index).copied()
    }

    /// Committed letters by index; `None` for open or empty slots.
    #[must_use]
    pub fn answers(&self) -> Vec<Option<Letter>> {
        self.answers.iter().map(|slot| slot.letter()).collect()
    }

    #[must_use]
    pub fn is_flagged(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn timer_mode(&self) -> TimerMode {
        self.timer_mode
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    #[must_use]
    pub fn pending(&self) -> Option<Letter> {
        self.pending
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn summary(&self) -> Option<&QuizSummary> {
        self.summary.as_ref()
    }

    /// True while per-question mode forbids moving backwards.
    #[must_use]
    pub fn navigation_locked(&self) -> bool {
        self.timer_mode.is_per_question() && !self.submitted
    }

    /// True once the current question's answer should be shown.
    #[must_use]
    pub fn is_revealed(&self, index: usize) -> bool {
        self.submitted || self.answers.get(index).is_some_and(|slot| slot.is_committed())
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let committed = self.answers.iter().filter(|s| s.is_committed()).count();
        SessionProgress {
            total: self.items.len(),
            committed,
            flagged: self.flags.iter().filter(|f| **f).count(),
            remaining: self.items.len() - committed,
            is_complete: self.submitted,
        }
    }

    /// Tentatively choose an option for the current question.
    ///
    /// Returns false (and changes nothing) once the quiz is submitted or the
    /// current question is committed.
    pub fn select_pending(&mut self, letter: Letter) -> bool {
        if self.submitted || self.answers[self.current].is_committed() {
            return false;
        }
        self.pending = Some(letter);
        true
    }

    /// Commit the pending selection for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSelection` if the slot is open and nothing is selected.
    pub fn commit_pending(&mut self) -> Result<CommitOutcome, SessionError> {
        if let Some(blocked) = self.commit_blocked() {
            return Ok(blocked);
        }
        let letter = self.pending.ok_or(SessionError::NoSelection)?;
        Ok(self.commit(Some(letter)))
    }

    /// Close the current slot without an answer, ignoring any pending selection.
    pub fn commit_timeout(&mut self) -> CommitOutcome {
        self.commit(None)
    }

    fn commit_blocked(&self) -> Option<CommitOutcome> {
        if self.submitted {
            Some(CommitOutcome::Submitted)
        } else if self.answers[self.current].is_committed() {
            Some(CommitOutcome::AlreadyCommitted)
        } else {
            None
        }
    }

    fn commit(&mut self, letter: Option<Letter>) -> CommitOutcome {
        if let Some(blocked) = self.commit_blocked() {
            return blocked;
        }
        self.answers[self.current] = AnswerSlot::Committed(letter);
        CommitOutcome::Committed(letter)
    }

    /// Move to the next question. Returns false at the last question.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.move_to(self.current + 1);
        true
    }

    /// Move to the previous question. Returns false at the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NavigationLocked` in per-question mode before submission.
    pub fn retreat(&mut self) -> Result<bool, SessionError> {
        if self.navigation_locked() {
            return Err(SessionError::NavigationLocked {
                action: NavAction::Back,
            });
        }
        if self.current == 0 {
            return Ok(false);
        }
        self.move_to(self.current - 1);
        Ok(true)
    }

    /// Jump straight to `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NavigationLocked` in per-question mode before submission,
    /// or `SessionError::OutOfRange` if `index` is not a question.
    pub fn jump_to(&mut self, index: usize) -> Result<bool, SessionError> {
        if self.navigation_locked() {
            return Err(SessionError::NavigationLocked {
                action: NavAction::Jump,
            });
        }
        if index >= self.items.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.move_to(index);
        Ok(true)
    }

    fn move_to(&mut self, index: usize) {
        self.current = index;
        self.pending = None;
    }

    /// Flip the review flag of the current question. No-op once submitted.
    pub fn toggle_flag(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        self.flags[self.current] = !self.flags[self.current];
        true
    }

    pub(crate) fn set_remaining(&mut self, secs: u32) {
        self.remaining_secs = secs;
    }

    pub(crate) fn reset_remaining(&mut self) {
        self.remaining_secs = self.time_limit_secs;
    }

    pub(crate) fn set_timer_active(&mut self, active: bool) {
        self.timer_active = active;
    }

    /// Submit the quiz and compute the final score.
    ///
    /// Returns `None` if the quiz was already submitted.
    pub fn finish(&mut self, completed_at: DateTime<Utc>) -> Option<&QuizSummary> {
        if self.submitted {
            return None;
        }
        self.submitted = true;
        self.pending = None;
        self.timer_active = false;

        let scored: Vec<ScoredAnswer> = self
            .items
            .iter()
            .zip(&self.answers)
            .zip(&self.flags)
            .map(|((item, slot), flagged)| ScoredAnswer {
                chosen: slot.letter(),
                correct: item.correct_letter(),
                flagged: *flagged,
            })
            .collect();
        // A clock that runs backwards should not lose the score.
        let completed_at = completed_at.max(self.started_at);
        self.summary = QuizSummary::tally(self.started_at, completed_at, &scored).ok();
        self.summary.as_ref()
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("items_len", &self.items.len())
            .field("current", &self.current)
            .field("answers", &self.answers)
            .field("flags", &self.flags)
            .field("submitted", &self.submitted)
            .field("timer_mode", &self.timer_mode)
            .field("remaining_secs", &self.remaining_secs)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
