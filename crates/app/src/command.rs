use std::fmt;
use std::path::PathBuf;

use quiz_core::model::Letter;

/// One line of user input at the quiz prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(Letter),
    Check,
    Next,
    Previous,
    /// Zero-based question index.
    Jump(usize),
    Flag,
    Finish,
    Retry,
    /// Load a different idiom file and start over.
    Open(PathBuf),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    InvalidJump { raw: String },
    MissingPath,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => f.write_str("type a command, or h for help"),
            CommandError::Unknown(raw) => write!(f, "unknown command: {raw}"),
            CommandError::InvalidJump { raw } => {
                write!(f, "g expects a question number starting at 1: {raw}")
            }
            CommandError::MissingPath => f.write_str("o expects a file path"),
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Empty);
        };

        match head.to_ascii_lowercase().as_str() {
            "k" | "check" => Ok(Self::Check),
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" => Ok(Self::Previous),
            "f" | "flag" => Ok(Self::Flag),
            "s" | "finish" => Ok(Self::Finish),
            "r" | "retry" => Ok(Self::Retry),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" => Ok(Self::Quit),
            "o" | "open" => {
                let path = line[head.len()..].trim();
                if path.is_empty() {
                    return Err(CommandError::MissingPath);
                }
                Ok(Self::Open(PathBuf::from(path)))
            }
            "g" | "go" => {
                let raw = parts.next().unwrap_or_default();
                raw.parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .map(Self::Jump)
                    .ok_or_else(|| CommandError::InvalidJump {
                        raw: raw.to_owned(),
                    })
            }
            other => other
                .parse::<Letter>()
                .map(Self::Select)
                .map_err(|_| CommandError::Unknown(line.to_owned())),
        }
    }
}

pub const HELP: &str = "\
Commands:
  a b c d   select an option
  k         check (commit) the selected option
  n / p     next / previous question
  g <n>     jump to question n
  f         flag or unflag the current question
  s         finish and score the quiz
  r         retry with the same records
  o <path>  open another idiom file
  h         this help
  q         quit";
