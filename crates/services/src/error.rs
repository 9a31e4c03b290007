//! Shared error types for the services crate.

use std::fmt;

use quiz_core::BuildError;
use quiz_core::model::QuizSettingsError;
use storage::SourceError;
use thiserror::Error;

/// Navigation request that per-question mode can refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Back,
    Jump,
}

impl fmt::Display for NavAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavAction::Back => f.write_str("cannot go back in per-question mode"),
            NavAction::Jump => f.write_str("navigator locked in per-question mode"),
        }
    }
}

/// Recoverable, user-facing session errors. None of these mutate the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("please select an option first")]
    NoSelection,
    #[error("{action}")]
    NavigationLocked { action: NavAction },
    #[error("question {index} does not exist, quiz has {len}")]
    OutOfRange { index: usize, len: usize },
}

/// Errors that prevent a quiz session from being created.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SetupError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
