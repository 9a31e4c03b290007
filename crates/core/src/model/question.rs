use serde::{Deserialize, Serialize};

use crate::model::Letter;

/// One source row: an idiom and what it means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub idiom: String,
    pub meaning: String,
}

impl Record {
    #[must_use]
    pub fn new(idiom: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            idiom: idiom.into(),
            meaning: meaning.into(),
        }
    }
}

/// A labelled answer choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    letter: Letter,
    idiom: String,
    meaning: String,
    is_correct: bool,
}

impl QuizOption {
    #[must_use]
    pub fn letter(&self) -> Letter {
        self.letter
    }

    #[must_use]
    pub fn idiom(&self) -> &str {
        &self.idiom
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

/// A four-option multiple-choice question.
///
/// The prompt is the meaning of the correct idiom; exactly one option is
/// correct and its letter is `correct_letter`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    options: [QuizOption; 4],
    correct_letter: Letter,
}

impl Question {
    /// Build a question from choices already placed in their final order.
    ///
    /// `choices[i]` becomes option `Letter::ALL[i]`. The boolean marks the
    /// correct choice.
    ///
    /// Returns `None` unless exactly one choice is marked correct.
    #[must_use]
    pub fn from_ordered(choices: [(&Record, bool); 4]) -> Option<Self> {
        let mut correct = choices
            .iter()
            .enumerate()
            .filter(|(_, (_, is_correct))| *is_correct);
        let (correct_idx, (correct_record, _)) = correct.next()?;
        if correct.next().is_some() {
            return None;
        }
        let correct_letter = Letter::from_index(correct_idx)?;
        let prompt = correct_record.meaning.clone();

        let options = Letter::ALL.map(|letter| {
            let (record, is_correct) = choices[letter.index()];
            QuizOption {
                letter,
                idiom: record.idiom.clone(),
                meaning: record.meaning.clone(),
                is_correct,
            }
        });

        Some(Self {
            prompt,
            options,
            correct_letter,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[QuizOption; 4] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, letter: Letter) -> &QuizOption {
        &self.options[letter.index()]
    }

    #[must_use]
    pub fn correct_letter(&self) -> Letter {
        self.correct_letter
    }

    #[must_use]
    pub fn is_correct(&self, letter: Letter) -> bool {
        self.correct_letter == letter
    }
}
