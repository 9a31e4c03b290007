use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::BuildError;
use crate::model::{Question, Record};

/// Number of options on every generated question.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Turns a flat list of records into shuffled four-option questions.
///
/// One random stream drives the whole build: the record shuffle is drawn
/// first, then one option shuffle per question in question order. A fixed
/// seed therefore reproduces the exact same quiz.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionSetBuilder {
    seed: Option<u64>,
}

impl QuestionSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Build the question sequence.
    ///
    /// - Records are shuffled, then repeated whole until at least four exist.
    /// - Consecutive chunks of four become questions; the first record of a
    ///   chunk is the answer, the rest are distractors.
    /// - A short final chunk borrows from the start of the shuffled list, so
    ///   the same record may appear in more than one question.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::EmptyInput` when `records` is empty.
    pub fn build(&self, records: &[Record]) -> Result<Vec<Question>, BuildError> {
        if records.is_empty() {
            return Err(BuildError::EmptyInput);
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut shuffled = records.to_vec();
        shuffled.shuffle(&mut rng);
        while shuffled.len() < OPTIONS_PER_QUESTION {
            shuffled.extend_from_within(..);
        }

        let mut questions = Vec::with_capacity(shuffled.len().div_ceil(OPTIONS_PER_QUESTION));
        for chunk in shuffled.chunks(OPTIONS_PER_QUESTION) {
            let mut picks: Vec<&Record> = chunk.iter().collect();
            let missing = OPTIONS_PER_QUESTION - picks.len();
            picks.extend(shuffled.iter().take(missing));
            questions.push(question_from_chunk(&picks, &mut rng));
        }
        Ok(questions)
    }
}

fn question_from_chunk(picks: &[&Record], rng: &mut StdRng) -> Question {
    let mut choices: [(&Record, bool); OPTIONS_PER_QUESTION] = [
        (picks[0], true),
        (picks[1], false),
        (picks[2], false),
        (picks[3], false),
    ];
    choices.shuffle(rng);
    Question::from_ordered(choices)
        .unwrap_or_else(|| unreachable!("exactly one choice is marked correct"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Letter;
    use std::collections::HashSet;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(format!("idiom {i}"), format!("meaning {i}")))
            .collect()
    }

    #[test]
    fn same_seed_builds_identical_quiz() {
        let recs = records(13);
        let builder = QuestionSetBuilder::new().with_seed(Some(7));

        let first = builder.build(&recs).unwrap();
        let second = builder.build(&recs).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let recs = records(20);
        let a = QuestionSetBuilder::new().with_seed(Some(1)).build(&recs).unwrap();
        let b = QuestionSetBuilder::new().with_seed(Some(2)).build(&recs).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn every_question_has_exactly_one_correct_option() {
        let recs = records(17);
        let questions = QuestionSetBuilder::new().build(&recs).unwrap();

        for q in &questions {
            let correct: Vec<_> = q.options().iter().filter(|o| o.is_correct()).collect();
            assert_eq!(correct.len(), 1);
            assert_eq!(correct[0].letter(), q.correct_letter());
            assert_eq!(correct[0].meaning(), q.prompt());
        }
    }

    #[test]
    fn letters_are_assigned_in_order() {
        let questions = QuestionSetBuilder::new()
            .with_seed(Some(3))
            .build(&records(8))
            .unwrap();
        for q in &questions {
            let letters: Vec<_> = q.options().iter().map(|o| o.letter()).collect();
            assert_eq!(letters, Letter::ALL.to_vec());
        }
    }

    #[test]
    fn question_count_is_ceiling_of_records_over_four() {
        for (n, expected) in [(4, 1), (5, 2), (8, 2), (9, 3), (12, 3)] {
            let questions = QuestionSetBuilder::new().build(&records(n)).unwrap();
            assert_eq!(questions.len(), expected, "{n} records");
        }
    }

    #[test]
    fn each_record_is_asked_once_when_divisible_by_four() {
        let recs = records(12);
        let questions = QuestionSetBuilder::new().with_seed(Some(11)).build(&recs).unwrap();

        let prompts: HashSet<_> = questions.iter().map(|q| q.prompt().to_owned()).collect();
        assert_eq!(prompts.len(), 3);

        let idioms: HashSet<_> = questions
            .iter()
            .flat_map(|q| q.options().iter().map(|o| o.idiom().to_owned()))
            .collect();
        assert_eq!(idioms.len(), 12);
    }

    #[test]
    fn three_records_double_into_two_questions_with_wraparound() {
        let recs = records(3);
        let questions = QuestionSetBuilder::new().with_seed(Some(5)).build(&recs).unwrap();

        // Shuffled [s0 s1 s2] doubles to [s0 s1 s2 s0 s1 s2]: chunks
        // [s0 s1 s2 s0] and [s1 s2], the latter topped up with s0 s1.
        assert_eq!(questions.len(), 2);

        let answer_idiom = |q: &Question| {
            q.options()
                .iter()
                .find(|o| o.is_correct())
                .map(|o| o.idiom().to_owned())
                .unwrap()
        };
        let first_answer = answer_idiom(&questions[0]);
        let second_answer = answer_idiom(&questions[1]);
        assert_ne!(first_answer, second_answer);

        let second = &questions[1];
        assert!(second.options().iter().any(|o| o.idiom() == first_answer));
        assert_eq!(
            second
                .options()
                .iter()
                .filter(|o| o.idiom() == second_answer)
                .count(),
            2
        );

        let source: HashSet<_> = recs.iter().map(|r| r.idiom.clone()).collect();
        for q in &questions {
            assert!(q.options().iter().all(|o| source.contains(o.idiom())));
        }
    }

    #[test]
    fn single_record_fills_all_options() {
        let questions = QuestionSetBuilder::new().build(&records(1)).unwrap();
        assert_eq!(questions.len(), 1);
        assert!(questions[0].options().iter().all(|o| o.idiom() == "idiom 0"));
        assert_eq!(
            questions[0].options().iter().filter(|o| o.is_correct()).count(),
            1
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = QuestionSetBuilder::new().build(&[]).unwrap_err();
        assert_eq!(err, BuildError::EmptyInput);
    }
}
