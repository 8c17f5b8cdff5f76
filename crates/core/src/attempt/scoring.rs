use std::collections::HashMap;

use crate::model::{Question, QuestionId};
use crate::progress::percent;

/// Minimum score (inclusive) displayed as a pass.
pub const PASS_THRESHOLD: u8 = 50;

/// Result of scoring a set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    /// `round(100 × correct / total)`, 0 for a quiz without questions.
    pub percent: u8,
}

impl Score {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.percent >= PASS_THRESHOLD
    }
}

/// Score recorded answers against the questions' correct options.
///
/// Unanswered questions and out-of-range picks count as wrong.
#[must_use]
pub fn score_answers(questions: &[Question], answers: &HashMap<QuestionId, usize>) -> Score {
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|picked| q.is_correct(*picked)))
        .count();
    let correct = u32::try_from(correct).unwrap_or(u32::MAX);
    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);

    Score {
        correct,
        total,
        percent: percent(correct, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, correct: usize) -> Question {
        Question {
            id: QuestionId::new(id),
            text: format!("Q{id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index: correct,
            quiz_id: None,
        }
    }

    #[test]
    fn scores_half_with_wrong_and_missing_answers() {
        let questions = vec![question(1, 0), question(2, 1), question(3, 2), question(4, 3)];
        let answers = HashMap::from([
            (QuestionId::new(1), 0),
            (QuestionId::new(2), 1),
            (QuestionId::new(3), 9),
        ]);

        let score = score_answers(&questions, &answers);

        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 4);
        assert_eq!(score.percent, 50);
        assert!(score.passed());
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let score = score_answers(&[], &HashMap::new());
        assert_eq!(score.percent, 0);
        assert_eq!(score.total, 0);
        assert!(!score.passed());
    }

    #[test]
    fn rounds_to_nearest_percent() {
        let questions = vec![question(1, 0), question(2, 0), question(3, 0)];
        let answers = HashMap::from([(QuestionId::new(1), 0), (QuestionId::new(2), 0)]);
        assert_eq!(score_answers(&questions, &answers).percent, 67);
    }

    #[test]
    fn answers_for_other_questions_are_ignored() {
        let questions = vec![question(1, 0)];
        let answers = HashMap::from([(QuestionId::new(42), 0)]);
        let score = score_answers(&questions, &answers);
        assert_eq!(score.correct, 0);
        assert!(!score.passed());
    }
}
