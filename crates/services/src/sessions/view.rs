use serde::Serialize;
use std::fmt;

use quiz_core::format_countdown;
use quiz_core::model::{Letter, QuizSummary, TimerMode};

use super::progress::SessionProgress;
use super::state::{AnswerSlot, SessionState};

/// Visual state of one answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionState {
    Neutral,
    /// Tentatively chosen, not yet committed.
    Selected,
    /// Revealed as the right answer.
    Correct,
    /// Revealed as the user's wrong pick.
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub letter: Letter,
    pub idiom: String,
    pub state: OptionState,
    pub disabled: bool,
}

/// Status of one navigator cell. `Current` wins over everything else.
///
/// A question closed by a timeout counts as unanswered: neutral or flagged
/// until submission, wrong afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavCell {
    Neutral,
    Flagged,
    Correct,
    Wrong,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedbackStatus {
    Correct,
    Incorrect,
    NotAnswered,
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackStatus::Correct => f.write_str("Correct"),
            FeedbackStatus::Incorrect => f.write_str("Incorrect"),
            FeedbackStatus::NotAnswered => f.write_str("Not Answered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub letter: Letter,
    pub idiom: String,
    pub meaning: String,
    pub is_correct: bool,
    pub is_chosen: bool,
}

/// Explanation shown once a question is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub status: FeedbackStatus,
    pub definitions: Vec<Definition>,
}

impl Feedback {
    /// Plain-text rendering: the status line, then every option with its
    /// meaning. `*` marks the correct option, `>` the user's pick.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{}\n\nDefinitions:\n", self.status);
        for def in &self.definitions {
            let marker = match (def.is_correct, def.is_chosen) {
                (true, _) => "*",
                (false, true) => ">",
                (false, false) => " ",
            };
            out.push_str(&format!(
                "{marker} {}: {}\n    {}\n",
                def.letter, def.idiom, def.meaning
            ));
        }
        out
    }
}

/// Read model published after every session change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub index: usize,
    pub total: usize,
    pub mode: TimerMode,
    pub prompt: String,
    pub options: Vec<OptionView>,
    pub feedback: Option<Feedback>,
    pub navigator: Vec<NavCell>,
    pub timer: String,
    pub timer_active: bool,
    pub flagged: bool,
    pub submitted: bool,
    pub navigation_locked: bool,
    pub progress: SessionProgress,
    pub summary: Option<QuizSummary>,
}

impl SessionView {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        let index = state.current_index();
        let question = state.current_question();
        let revealed = state.is_revealed(index);
        let chosen = state.slot(index).and_then(AnswerSlot::letter);
        let correct = question.correct_letter();

        let options = question
            .options()
            .iter()
            .map(|opt| {
                let letter = opt.letter();
                let visual = if revealed {
                    if letter == correct {
                        OptionState::Correct
                    } else if Some(letter) == chosen {
                        OptionState::Wrong
                    } else {
                        OptionState::Neutral
                    }
                } else if Some(letter) == state.pending() {
                    OptionState::Selected
                } else {
                    OptionState::Neutral
                };
                OptionView {
                    letter,
                    idiom: opt.idiom().to_owned(),
                    state: visual,
                    disabled: revealed,
                }
            })
            .collect();

        let feedback = revealed.then(|| {
            let status = match chosen {
                Some(letter) if letter == correct => FeedbackStatus::Correct,
                Some(_) => FeedbackStatus::Incorrect,
                None => FeedbackStatus::NotAnswered,
            };
            let definitions = question
                .options()
                .iter()
                .map(|opt| Definition {
                    letter: opt.letter(),
                    idiom: opt.idiom().to_owned(),
                    meaning: opt.meaning().to_owned(),
                    is_correct: opt.is_correct(),
                    is_chosen: Some(opt.letter()) == chosen,
                })
                .collect();
            Feedback {
                status,
                definitions,
            }
        });

        let navigator = (0..state.len()).map(|i| nav_cell(state, i)).collect();

        Self {
            index,
            total: state.len(),
            mode: state.timer_mode(),
            prompt: question.prompt().to_owned(),
            options,
            feedback,
            navigator,
            timer: format_countdown(state.remaining_secs()),
            timer_active: state.timer_active(),
            flagged: state.is_flagged(index),
            submitted: state.is_submitted(),
            navigation_locked: state.navigation_locked(),
            progress: state.progress(),
            summary: state.summary().cloned(),
        }
    }

    #[must_use]
    pub fn option(&self, letter: Letter) -> &OptionView {
        &self.options[letter.index()]
    }
}

fn nav_cell(state: &SessionState, index: usize) -> NavCell {
    if index == state.current_index() {
        return NavCell::Current;
    }
    let correct = state.items()[index].correct_letter();
    match state.slot(index).unwrap_or_default() {
        AnswerSlot::Committed(Some(letter)) if letter == correct => NavCell::Correct,
        AnswerSlot::Committed(Some(_)) => NavCell::Wrong,
        // Open or timed out: unanswered either way.
        _ if state.is_submitted() => NavCell::Wrong,
        _ if state.is_flagged(index) => NavCell::Flagged,
        _ => NavCell::Neutral,
    }
}
