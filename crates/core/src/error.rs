use thiserror::Error;

/// Errors raised while turning source records into a question set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    #[error("no records to build questions from")]
    EmptyInput,
}
