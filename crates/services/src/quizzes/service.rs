use std::sync::Arc;

use backend::{QuizBackend, QuizResultRecord};
use course_core::attempt::{QuizOutcome, QuizSession, SubmitTrigger, Tick};
use course_core::completion::MutationState;
use course_core::model::QuizId;

use super::runner::QuizRunner;
use crate::Clock;
use crate::error::QuizServiceError;

/// Fetches quizzes and drives attempts through submission and upload.
///
/// Every submission path funnels through `QuizSession::submit`, so only the
/// first of a manual submit and an expiring countdown produces an outcome
/// and a result upload.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    quizzes: Arc<dyn QuizBackend>,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn QuizBackend>) -> Self {
        Self { clock, quizzes }
    }

    /// Fetch the quiz and start a fresh attempt.
    ///
    /// A fetch failure is logged and leaves the runner in `QuizPhase::Failed`.
    pub async fn start(&self, quiz_id: QuizId) -> QuizRunner {
        let mut runner = QuizRunner::loading(quiz_id);
        match self.quizzes.quiz(quiz_id).await {
            Ok(quiz) => {
                tracing::debug!(
                    %quiz_id,
                    questions = quiz.questions.len(),
                    time_limit_secs = quiz.time_limit_secs(),
                    "quiz started"
                );
                runner.activate(QuizSession::new(quiz, self.clock.now()));
            }
            Err(err) => {
                tracing::error!(%quiz_id, error = %err, "failed to load quiz");
                runner.fail(err.to_string());
            }
        }
        runner
    }

    /// Advance the countdown by one second, submitting and uploading on expiry.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotRunning` if the quiz never loaded.
    pub async fn tick(&self, runner: &mut QuizRunner) -> Result<Tick, QuizServiceError> {
        let quiz_id = runner.quiz_id();
        let now = self.clock.now();
        let tick = runner
            .session_mut()
            .ok_or(QuizServiceError::NotRunning(quiz_id))?
            .tick(now);

        if let Tick::Expired(outcome) = &tick {
            tracing::info!(%quiz_id, score = outcome.score, "time is up, quiz submitted");
            self.persist(runner, outcome).await;
        }
        Ok(tick)
    }

    /// Submit the attempt on the learner's request.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotRunning` if the quiz never loaded and
    /// `QuizServiceError::Session` with `AlreadySubmitted` if the attempt was
    /// already submitted by either path.
    pub async fn submit(&self, runner: &mut QuizRunner) -> Result<QuizOutcome, QuizServiceError> {
        let quiz_id = runner.quiz_id();
        let now = self.clock.now();
        let outcome = runner
            .session_mut()
            .ok_or(QuizServiceError::NotRunning(quiz_id))?
            .submit(SubmitTrigger::Manual, now)?;

        tracing::info!(%quiz_id, score = outcome.score, passed = outcome.passed, "quiz submitted");
        self.persist(runner, &outcome).await;
        Ok(outcome)
    }

    /// Upload a scored attempt. Failures are recorded on the runner only.
    async fn persist(&self, runner: &mut QuizRunner, outcome: &QuizOutcome) {
        let record = QuizResultRecord {
            quiz_id: outcome.quiz_id,
            score: outcome.score,
            time_taken_in_seconds: outcome.time_used_secs,
        };
        runner.set_persistence(MutationState::Pending);
        match self.quizzes.submit_result(&record).await {
            Ok(()) => runner.set_persistence(MutationState::Confirmed),
            Err(err) => {
                tracing::warn!(
                    quiz_id = %outcome.quiz_id,
                    error = %err,
                    "failed to save quiz result"
                );
                runner.set_persistence(MutationState::Failed(err.to_string()));
            }
        }
    }
}
