use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

use crate::model::{Question, QuestionId, Quiz, QuizId};

use super::review::{QuestionReview, review_question};
use super::scoring::score_answers;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("quiz has already been submitted")]
    AlreadySubmitted,

    #[error("quiz has not been submitted yet")]
    NotSubmitted,

    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("question {question_id} has no option {option}")]
    InvalidOption {
        question_id: QuestionId,
        option: usize,
    },
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// What caused the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timer,
}

/// Scored result of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub quiz_id: QuizId,
    pub score: u8,
    pub correct: u32,
    pub total: u32,
    pub time_used_secs: u32,
    pub passed: bool,
    pub trigger: SubmitTrigger,
    pub submitted_at: DateTime<Utc>,
}

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Running { remaining_secs: u32 },
    /// The countdown hit zero and the attempt was submitted.
    Expired(QuizOutcome),
    /// The attempt was already submitted; nothing changed.
    Idle,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Ephemeral state of one quiz attempt.
///
/// Created when a quiz is opened and dropped on navigation away; nothing is
/// persisted until submission. Submission is one-shot: whichever of the
/// manual submit or the expiring countdown comes first wins.
pub struct QuizSession {
    quiz: Quiz,
    current: usize,
    answers: HashMap<QuestionId, usize>,
    flagged: BTreeSet<QuestionId>,
    initial_secs: u32,
    remaining_secs: u32,
    started_at: DateTime<Utc>,
    outcome: Option<QuizOutcome>,
    review_mode: bool,
}

impl QuizSession {
    /// Start an attempt, seeding the countdown from the quiz time limit.
    #[must_use]
    pub fn new(quiz: Quiz, started_at: DateTime<Utc>) -> Self {
        let initial_secs = quiz.time_limit_secs();
        Self {
            quiz,
            current: 0,
            answers: HashMap::new(),
            flagged: BTreeSet::new(),
            initial_secs,
            remaining_secs: initial_secs,
            started_at,
            outcome: None,
            review_mode: false,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.quiz.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.quiz.questions.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    // ─── Navigation ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.current)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.total_questions()
    }

    fn last_index(&self) -> usize {
        self.total_questions().saturating_sub(1)
    }

    /// Move to the next question, staying on the last one.
    pub fn go_next(&mut self) -> usize {
        self.current = (self.current + 1).min(self.last_index());
        self.current
    }

    /// Move to the previous question, staying on the first one.
    pub fn go_previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Jump to `index`, clamped into the question range.
    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index.min(self.last_index());
        self.current
    }

    /// `Question i sur n`, counting from 1.
    #[must_use]
    pub fn position_label(&self) -> String {
        let total = self.total_questions();
        let shown = if total == 0 { 0 } else { self.current + 1 };
        format!("Question {shown} sur {total}")
    }

    /// Position of the current question as a fraction in `0.0..=1.0`.
    #[must_use]
    pub fn position_fraction(&self) -> f64 {
        let total = self.total_questions();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = (self.current + 1) as f64 / total as f64;
        fraction
    }

    // ─── Answers & flags ───────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<(), QuizSessionError> {
        if self.is_submitted() {
            return Err(QuizSessionError::AlreadySubmitted);
        }
        Ok(())
    }

    fn question(&self, question_id: QuestionId) -> Result<&Question, QuizSessionError> {
        self.quiz
            .question(question_id)
            .ok_or(QuizSessionError::UnknownQuestion(question_id))
    }

    /// Record (or overwrite) the selected option for a question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadySubmitted` after submission.
    /// Returns `QuizSessionError::UnknownQuestion` or `InvalidOption` for bad input.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        option: usize,
    ) -> Result<(), QuizSessionError> {
        self.ensure_open()?;
        if !self.question(question_id)?.has_option(option) {
            return Err(QuizSessionError::InvalidOption {
                question_id,
                option,
            });
        }
        self.answers.insert(question_id, option);
        Ok(())
    }

    /// Select an option on the current question.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::select_answer`], plus `QuizSessionError::NoQuestions`
    /// for an empty quiz.
    pub fn select_current(&mut self, option: usize) -> Result<(), QuizSessionError> {
        let question_id = self
            .current_question()
            .map(|q| q.id)
            .ok_or(QuizSessionError::NoQuestions)?;
        self.select_answer(question_id, option)
    }

    #[must_use]
    pub fn selected(&self, question_id: QuestionId) -> Option<usize> {
        self.answers.get(&question_id).copied()
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, usize> {
        &self.answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Toggle the flag marker on a question. Returns the new flag state.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadySubmitted` after submission.
    /// Returns `QuizSessionError::UnknownQuestion` for ids outside this quiz.
    pub fn toggle_flag(&mut self, question_id: QuestionId) -> Result<bool, QuizSessionError> {
        self.ensure_open()?;
        self.question(question_id)?;
        if self.flagged.remove(&question_id) {
            Ok(false)
        } else {
            self.flagged.insert(question_id);
            Ok(true)
        }
    }

    #[must_use]
    pub fn is_flagged(&self, question_id: QuestionId) -> bool {
        self.flagged.contains(&question_id)
    }

    #[must_use]
    pub fn flagged(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.flagged.iter().copied()
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    // ─── Countdown ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn initial_secs(&self) -> u32 {
        self.initial_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn time_used_secs(&self) -> u32 {
        self.initial_secs - self.remaining_secs
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero submits with whatever answers are recorded at that instant.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        if self.is_submitted() {
            return Tick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return Tick::Running {
                remaining_secs: self.remaining_secs,
            };
        }
        match self.submit(SubmitTrigger::Timer, now) {
            Ok(outcome) => Tick::Expired(outcome),
            Err(_) => Tick::Idle,
        }
    }

    // ─── Submission ────────────────────────────────────────────────────────────

    /// Score the attempt and close it.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadySubmitted` on every call after the first.
    pub fn submit(
        &mut self,
        trigger: SubmitTrigger,
        now: DateTime<Utc>,
    ) -> Result<QuizOutcome, QuizSessionError> {
        self.ensure_open()?;

        let score = score_answers(&self.quiz.questions, &self.answers);
        let outcome = QuizOutcome {
            quiz_id: self.quiz.id,
            score: score.percent,
            correct: score.correct,
            total: score.total,
            time_used_secs: self.time_used_secs(),
            passed: score.passed(),
            trigger,
            submitted_at: now,
        };
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    // ─── Review ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn review_mode(&self) -> bool {
        self.review_mode
    }

    /// Turn review mode on or off.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NotSubmitted` before submission.
    pub fn set_review_mode(&mut self, enabled: bool) -> Result<(), QuizSessionError> {
        if !self.is_submitted() {
            return Err(QuizSessionError::NotSubmitted);
        }
        self.review_mode = enabled;
        Ok(())
    }

    /// Per-question review of a submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NotSubmitted` before submission.
    pub fn review(&self) -> Result<Vec<QuestionReview>, QuizSessionError> {
        if !self.is_submitted() {
            return Err(QuizSessionError::NotSubmitted);
        }
        Ok(self
            .quiz
            .questions
            .iter()
            .map(|q| review_question(q, self.selected(q.id)))
            .collect())
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id)
            .field("questions_len", &self.quiz.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("remaining_secs", &self.remaining_secs)
            .field("submitted", &self.is_submitted())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::OptionMark;
    use crate::model::CourseId;
    use crate::time::fixed_now;

    fn question(id: u64, correct: usize) -> Question {
        Question {
            id: QuestionId::new(id),
            text: format!("Question {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index: correct,
            quiz_id: Some(QuizId::new(1)),
        }
    }

    fn quiz(questions: Vec<Question>, time_limit: Option<u32>) -> Quiz {
        Quiz {
            id: QuizId::new(1),
            title: "Ownership".into(),
            description: None,
            course_id: Some(CourseId::new(1)),
            chapter_id: None,
            questions,
            time_limit,
            is_completed: false,
        }
    }

    fn four_questions() -> QuizSession {
        QuizSession::new(
            quiz(
                vec![question(1, 0), question(2, 1), question(3, 2), question(4, 3)],
                None,
            ),
            fixed_now(),
        )
    }

    #[test]
    fn seeds_timer_and_starts_on_first_question() {
        let session = four_questions();
        assert_eq!(session.initial_secs(), 15 * 60);
        assert_eq!(session.remaining_secs(), 15 * 60);
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_submitted());
    }

    #[test]
    fn navigation_is_clamped() {
        let mut session = four_questions();
        assert_eq!(session.go_previous(), 0);
        assert_eq!(session.go_next(), 1);
        assert_eq!(session.go_to(10), 3);
        assert!(session.is_last_question());
        assert_eq!(session.go_next(), 3);
        assert_eq!(session.go_to(0), 0);
        assert_eq!(session.position_label(), "Question 1 sur 4");
        assert!((session.position_fraction() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn navigation_on_empty_quiz_stays_at_zero() {
        let mut session = QuizSession::new(quiz(Vec::new(), None), fixed_now());
        assert_eq!(session.go_next(), 0);
        assert_eq!(session.go_previous(), 0);
        assert!(session.current_question().is_none());
        assert_eq!(session.position_label(), "Question 0 sur 0");
        assert!(session.position_fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn reselecting_overwrites_answer() {
        let mut session = four_questions();
        session.select_answer(QuestionId::new(1), 2).unwrap();
        session.select_answer(QuestionId::new(1), 0).unwrap();
        assert_eq!(session.selected(QuestionId::new(1)), Some(0));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn rejects_unknown_question_and_option() {
        let mut session = four_questions();
        assert_eq!(
            session.select_answer(QuestionId::new(99), 0),
            Err(QuizSessionError::UnknownQuestion(QuestionId::new(99)))
        );
        assert_eq!(
            session.select_answer(QuestionId::new(1), 4),
            Err(QuizSessionError::InvalidOption {
                question_id: QuestionId::new(1),
                option: 4,
            })
        );
    }

    #[test]
    fn flags_toggle_and_do_not_block_submission() {
        let mut session = four_questions();
        assert!(session.toggle_flag(QuestionId::new(2)).unwrap());
        assert!(session.is_flagged(QuestionId::new(2)));
        assert!(session.toggle_flag(QuestionId::new(3)).unwrap());
        assert!(!session.toggle_flag(QuestionId::new(3)).unwrap());
        assert_eq!(session.flagged().collect::<Vec<_>>(), vec![QuestionId::new(2)]);
        assert_eq!(session.flagged_count(), 1);

        assert_eq!(session.go_next(), 1);
        assert!(session.submit(SubmitTrigger::Manual, fixed_now()).is_ok());
    }

    #[test]
    fn submit_scores_and_records_time_used() {
        let mut session = four_questions();
        session.select_answer(QuestionId::new(1), 0).unwrap();
        session.select_answer(QuestionId::new(2), 1).unwrap();
        session.select_answer(QuestionId::new(3), 3).unwrap();
        for _ in 0..30 {
            session.tick(fixed_now());
        }

        let outcome = session.submit(SubmitTrigger::Manual, fixed_now()).unwrap();

        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.correct, 2);
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.time_used_secs, 30);
        assert!(outcome.passed);
        assert_eq!(outcome.trigger, SubmitTrigger::Manual);
    }

    #[test]
    fn empty_quiz_submits_zero() {
        let mut session = QuizSession::new(quiz(Vec::new(), Some(1)), fixed_now());
        let outcome = session.submit(SubmitTrigger::Manual, fixed_now()).unwrap();
        assert_eq!(outcome.score, 0);
        assert!(!outcome.passed);
    }

    #[test]
    fn second_submit_is_rejected() {
        let mut session = four_questions();
        session.submit(SubmitTrigger::Manual, fixed_now()).unwrap();
        assert_eq!(
            session.submit(SubmitTrigger::Manual, fixed_now()),
            Err(QuizSessionError::AlreadySubmitted)
        );
        assert_eq!(
            session.select_answer(QuestionId::new(1), 0),
            Err(QuizSessionError::AlreadySubmitted)
        );
        assert_eq!(
            session.toggle_flag(QuestionId::new(1)),
            Err(QuizSessionError::AlreadySubmitted)
        );
    }

    #[test]
    fn countdown_expiry_submits_exactly_once_with_current_answers() {
        let mut session = QuizSession::new(
            quiz(vec![question(1, 0), question(2, 1)], Some(1)),
            fixed_now(),
        );
        session.select_answer(QuestionId::new(1), 0).unwrap();

        let mut expired = Vec::new();
        for _ in 0..59 {
            match session.tick(fixed_now()) {
                Tick::Running { .. } => {}
                other => expired.push(other),
            }
        }
        assert!(expired.is_empty());
        assert_eq!(session.remaining_secs(), 1);

        let Tick::Expired(outcome) = session.tick(fixed_now()) else {
            panic!("countdown should expire on the 60th tick");
        };
        assert_eq!(outcome.trigger, SubmitTrigger::Timer);
        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.time_used_secs, 60);

        assert_eq!(session.tick(fixed_now()), Tick::Idle);
        assert_eq!(
            session.submit(SubmitTrigger::Manual, fixed_now()),
            Err(QuizSessionError::AlreadySubmitted)
        );
        assert_eq!(session.outcome(), Some(&outcome));
    }

    #[test]
    fn manual_submit_before_expiry_wins_over_timer() {
        let mut session = QuizSession::new(quiz(vec![question(1, 0)], Some(1)), fixed_now());
        for _ in 0..59 {
            session.tick(fixed_now());
        }
        let manual = session.submit(SubmitTrigger::Manual, fixed_now()).unwrap();
        assert_eq!(session.tick(fixed_now()), Tick::Idle);
        assert_eq!(session.outcome(), Some(&manual));
        assert_eq!(session.remaining_secs(), 1);
    }

    #[test]
    fn review_requires_submission() {
        let mut session = four_questions();
        assert_eq!(session.review(), Err(QuizSessionError::NotSubmitted));
        assert_eq!(
            session.set_review_mode(true),
            Err(QuizSessionError::NotSubmitted)
        );

        session.select_answer(QuestionId::new(2), 2).unwrap();
        session.submit(SubmitTrigger::Manual, fixed_now()).unwrap();
        session.set_review_mode(true).unwrap();
        assert!(session.review_mode());

        let review = session.review().unwrap();
        assert_eq!(review.len(), 4);
        let second = &review[1];
        assert_eq!(second.options[1].mark, Some(OptionMark::Correct));
        assert_eq!(second.options[2].mark, Some(OptionMark::YourAnswer));
        assert_eq!(second.options[0].mark, None);
        assert_eq!(second.options[3].mark, None);
    }
}
