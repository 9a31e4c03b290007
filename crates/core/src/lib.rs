#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod model;
pub mod time;

pub use builder::{OPTIONS_PER_QUESTION, QuestionSetBuilder};
pub use error::BuildError;
pub use time::{Clock, format_countdown};
