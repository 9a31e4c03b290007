use serde::Serialize;

/// Counts shown next to the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub committed: usize,
    pub flagged: usize,
    pub remaining: usize,
    pub is_complete: bool,
}
