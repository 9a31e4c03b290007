#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{NavAction, SessionError, SetupError};

pub use sessions::{
    AnswerSlot, CommitOutcome, Definition, Feedback, FeedbackStatus, NavCell, OptionState,
    OptionView, QuizLoopService, SessionController, SessionProgress, SessionState, SessionView,
    TimeoutAction, TimerEvent, TimerScheduler, TimerSettings,
};
