use std::fmt::Write as _;

use quiz_core::model::QuizSummary;
use services::{NavCell, OptionState, SessionView};

/// Plain-text rendering of the current session view.
pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Question {}/{}  [{}]  {}{}",
        view.index + 1,
        view.total,
        view.mode,
        view.timer,
        if view.flagged { "  (flagged)" } else { "" }
    );
    let _ = writeln!(out, "{}", navigator_line(&view.navigator));
    let _ = writeln!(out);
    let _ = writeln!(out, "Meaning: {}", view.prompt);
    for option in &view.options {
        let mark = match option.state {
            OptionState::Neutral => ' ',
            OptionState::Selected => '>',
            OptionState::Correct => '+',
            OptionState::Wrong => 'x',
        };
        let _ = writeln!(out, " {mark} {}) {}", option.letter, option.idiom);
    }

    if let Some(feedback) = &view.feedback {
        let _ = writeln!(out);
        out.push_str(&feedback.render());
    }
    if let Some(summary) = &view.summary {
        let _ = writeln!(out);
        out.push_str(&render_summary(summary));
    }
    out
}

fn navigator_line(cells: &[NavCell]) -> String {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            NavCell::Neutral => format!(" {} ", i + 1),
            NavCell::Flagged => format!("?{}?", i + 1),
            NavCell::Correct => format!("+{}+", i + 1),
            NavCell::Wrong => format!("x{}x", i + 1),
            NavCell::Current => format!("[{}]", i + 1),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_summary(summary: &QuizSummary) -> String {
    format!(
        "Total Questions: {}\nCorrect Answers: {}\nWrong Answers: {}\nAttempted Questions: {}\nMarked for Review: {}\n",
        summary.total(),
        summary.correct(),
        summary.wrong(),
        summary.attempted(),
        summary.marked()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_marks_each_cell_kind() {
        let line = navigator_line(&[
            NavCell::Current,
            NavCell::Correct,
            NavCell::Wrong,
            NavCell::Flagged,
            NavCell::Neutral,
        ]);
        assert_eq!(line, "[1] +2+ x3x ?4?  5 ");
    }
}
