use std::fmt;

use course_core::attempt::{QuizOutcome, QuizSession};
use course_core::completion::MutationState;
use course_core::model::QuizId;

/// Where an attempt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// The quiz is being fetched.
    Loading,
    InProgress,
    Submitted,
    /// The fetch failed; there is nothing to answer.
    Failed,
}

enum Stage {
    Loading,
    Failed(String),
    Active(Box<QuizSession>),
}

/// One quiz attempt as seen by a front end.
///
/// Wraps the core `QuizSession` with the fetch state that precedes it and the
/// state of the result upload that follows it. A failed upload never moves
/// the attempt out of `Submitted`.
pub struct QuizRunner {
    quiz_id: QuizId,
    stage: Stage,
    persistence: MutationState,
}

impl QuizRunner {
    #[must_use]
    pub fn loading(quiz_id: QuizId) -> Self {
        Self {
            quiz_id,
            stage: Stage::Loading,
            persistence: MutationState::Idle,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match &self.stage {
            Stage::Loading => QuizPhase::Loading,
            Stage::Failed(_) => QuizPhase::Failed,
            Stage::Active(session) if session.is_submitted() => QuizPhase::Submitted,
            Stage::Active(_) => QuizPhase::InProgress,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.stage {
            Stage::Active(session) => Some(&**session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        match &mut self.stage {
            Stage::Active(session) => Some(&mut **session),
            _ => None,
        }
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.session().and_then(QuizSession::outcome)
    }

    /// Why loading failed, if it did.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match &self.stage {
            Stage::Failed(reason) => Some(reason.as_str()),
            _ => None,
        }
    }

    /// State of the result upload.
    #[must_use]
    pub fn persistence(&self) -> &MutationState {
        &self.persistence
    }

    pub(crate) fn activate(&mut self, session: QuizSession) {
        self.stage = Stage::Active(Box::new(session));
        self.persistence = MutationState::Idle;
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.stage = Stage::Failed(reason.into());
    }

    pub(crate) fn set_persistence(&mut self, state: MutationState) {
        self.persistence = state;
    }
}

impl fmt::Debug for QuizRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizRunner")
            .field("quiz_id", &self.quiz_id)
            .field("phase", &self.phase())
            .field("persistence", &self.persistence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::attempt::SubmitTrigger;
    use course_core::model::Quiz;
    use course_core::time::fixed_now;

    fn session() -> QuizSession {
        QuizSession::new(
            Quiz {
                id: QuizId::new(3),
                title: "Lifetimes".into(),
                description: None,
                course_id: None,
                chapter_id: None,
                questions: Vec::new(),
                time_limit: Some(2),
                is_completed: false,
            },
            fixed_now(),
        )
    }

    #[test]
    fn phases_follow_the_attempt() {
        let mut runner = QuizRunner::loading(QuizId::new(3));
        assert_eq!(runner.phase(), QuizPhase::Loading);
        assert!(runner.session().is_none());

        runner.activate(session());
        assert_eq!(runner.phase(), QuizPhase::InProgress);

        runner
            .session_mut()
            .unwrap()
            .submit(SubmitTrigger::Manual, fixed_now())
            .unwrap();
        assert_eq!(runner.phase(), QuizPhase::Submitted);
        assert_eq!(runner.outcome().unwrap().quiz_id, QuizId::new(3));

        runner.set_persistence(MutationState::Failed("offline".into()));
        assert_eq!(runner.phase(), QuizPhase::Submitted);
    }

    #[test]
    fn failed_load_keeps_reason() {
        let mut runner = QuizRunner::loading(QuizId::new(3));
        runner.fail("status 404");
        assert_eq!(runner.phase(), QuizPhase::Failed);
        assert_eq!(runner.failure(), Some("status 404"));
        assert!(runner.session().is_none());
    }
}
