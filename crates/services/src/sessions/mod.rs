mod controller;
mod progress;
mod state;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::SessionController;
pub use progress::SessionProgress;
pub use state::{AnswerSlot, CommitOutcome, SessionState};
pub use timer::{TimeoutAction, TimerEvent, TimerScheduler, TimerSettings};
pub use view::{
    Definition, Feedback, FeedbackStatus, NavCell, OptionState, OptionView, SessionView,
};
pub use workflow::QuizLoopService;
