mod letter;
mod question;
mod settings;
mod summary;

pub use letter::{Letter, LetterError};
pub use question::{Question, QuizOption, Record};
pub use settings::{
    DEFAULT_TIME_LIMIT_SECS, QuizSettings, QuizSettingsDraft, QuizSettingsError, TimerMode,
};
pub use summary::{QuizSummary, QuizSummaryError, ScoredAnswer};
