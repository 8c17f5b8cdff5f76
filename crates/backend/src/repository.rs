use async_trait::async_trait;
use course_core::model::{
    ChapterId, ContentId, Course, CourseId, EnrollmentId, Quiz, QuizId, Stars,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by backend adapters.
///
/// Every non-2xx response is reported as `Status`; no status gets special
/// treatment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendError {
    #[error("no bearer token available for a user-scoped request")]
    Unauthenticated,

    #[error("not found")]
    NotFound,

    #[error("backend responded with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Body of `POST /QuizResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuizResultRecord {
    pub quiz_id: QuizId,
    pub score: u8,
    pub time_taken_in_seconds: u32,
}

/// Course-scoped backend operations.
#[async_trait]
pub trait CourseBackend: Send + Sync {
    /// Fetch the learner's snapshot of a course.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request fails or the payload does not decode.
    async fn course_progress(&self, course_id: CourseId) -> Result<Course, BackendError>;

    /// Mark a content item complete. Must be idempotent server-side.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request fails.
    async fn complete_content(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Result<(), BackendError>;

    /// Record a one-time rating.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request fails.
    async fn rate_course(&self, course_id: CourseId, stars: Stars) -> Result<(), BackendError>;

    /// Download the completion certificate as PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request fails.
    async fn certificate(&self, enrollment_id: EnrollmentId) -> Result<Vec<u8>, BackendError>;
}

/// Quiz-scoped backend operations.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Fetch a quiz with its questions.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request fails or the payload does not decode.
    async fn quiz(&self, quiz_id: QuizId) -> Result<Quiz, BackendError>;

    /// Record a scored attempt.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request fails.
    async fn submit_result(&self, result: &QuizResultRecord) -> Result<(), BackendError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Operations that can be made to fail on the in-memory backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CourseProgress,
    CompleteContent,
    RateCourse,
    Certificate,
    Quiz,
    SubmitResult,
}

#[derive(Default)]
struct InMemoryState {
    courses: HashMap<CourseId, Course>,
    quizzes: HashMap<QuizId, Quiz>,
    certificates: HashMap<EnrollmentId, Vec<u8>>,
    failures: HashMap<Operation, BackendError>,
    completions: Vec<(CourseId, ChapterId, ContentId)>,
    ratings: Vec<(CourseId, u8)>,
    results: Vec<QuizResultRecord>,
}

/// Simple in-memory backend for testing and offline use.
///
/// Completing content also recomputes the owning chapter's `completed` flag the
/// way the real backend does (all contents done and the chapter quiz, if any,
/// completed).
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryState>, BackendError> {
        self.state
            .lock()
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn insert_course(&self, course: Course) -> Result<(), BackendError> {
        self.lock()?.courses.insert(course.id, course);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn insert_quiz(&self, quiz: Quiz) -> Result<(), BackendError> {
        self.lock()?.quizzes.insert(quiz.id, quiz);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn insert_certificate(
        &self,
        enrollment_id: EnrollmentId,
        pdf: Vec<u8>,
    ) -> Result<(), BackendError> {
        self.lock()?.certificates.insert(enrollment_id, pdf);
        Ok(())
    }

    /// Make every call to `operation` fail with `error` until cleared.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn fail(&self, operation: Operation, error: BackendError) -> Result<(), BackendError> {
        self.lock()?.failures.insert(operation, error);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn clear_failure(&self, operation: Operation) -> Result<(), BackendError> {
        self.lock()?.failures.remove(&operation);
        Ok(())
    }

    /// Every completion request received, in order (duplicates included).
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn completions(&self) -> Result<Vec<(CourseId, ChapterId, ContentId)>, BackendError> {
        Ok(self.lock()?.completions.clone())
    }

    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn ratings(&self) -> Result<Vec<(CourseId, u8)>, BackendError> {
        Ok(self.lock()?.ratings.clone())
    }

    /// # Errors
    ///
    /// Returns `BackendError::Transport` if the state lock is poisoned.
    pub fn results(&self) -> Result<Vec<QuizResultRecord>, BackendError> {
        Ok(self.lock()?.results.clone())
    }
}

fn check(state: &InMemoryState, operation: Operation) -> Result<(), BackendError> {
    match state.failures.get(&operation) {
        Some(error) => Err(error.clone()),
        None => Ok(()),
    }
}

#[async_trait]
impl CourseBackend for InMemoryBackend {
    async fn course_progress(&self, course_id: CourseId) -> Result<Course, BackendError> {
        let guard = self.lock()?;
        check(&guard, Operation::CourseProgress)?;
        guard
            .courses
            .get(&course_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn complete_content(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Result<(), BackendError> {
        let mut guard = self.lock()?;
        check(&guard, Operation::CompleteContent)?;
        guard.completions.push((course_id, chapter_id, content_id));

        let chapter = guard
            .courses
            .get_mut(&course_id)
            .and_then(|course| course.chapter_mut(chapter_id))
            .ok_or(BackendError::NotFound)?;
        let item = chapter
            .content_mut(content_id)
            .ok_or(BackendError::NotFound)?;
        item.completed = true;

        let quiz_done = chapter.quiz.as_ref().is_none_or(|quiz| quiz.is_completed);
        chapter.completed = quiz_done && chapter.contents.iter().all(|c| c.completed);
        Ok(())
    }

    async fn rate_course(&self, course_id: CourseId, stars: Stars) -> Result<(), BackendError> {
        let mut guard = self.lock()?;
        check(&guard, Operation::RateCourse)?;
        let course = guard
            .courses
            .get_mut(&course_id)
            .ok_or(BackendError::NotFound)?;
        course.has_rated = true;
        course.rating = f64::from(stars.value());
        guard.ratings.push((course_id, stars.value()));
        Ok(())
    }

    async fn certificate(&self, enrollment_id: EnrollmentId) -> Result<Vec<u8>, BackendError> {
        let guard = self.lock()?;
        check(&guard, Operation::Certificate)?;
        guard
            .certificates
            .get(&enrollment_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }
}

#[async_trait]
impl QuizBackend for InMemoryBackend {
    async fn quiz(&self, quiz_id: QuizId) -> Result<Quiz, BackendError> {
        let guard = self.lock()?;
        check(&guard, Operation::Quiz)?;
        guard
            .quizzes
            .get(&quiz_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn submit_result(&self, result: &QuizResultRecord) -> Result<(), BackendError> {
        let mut guard = self.lock()?;
        check(&guard, Operation::SubmitResult)?;
        guard.results.push(result.clone());
        Ok(())
    }
}

/// Aggregates the backend traits behind trait objects for easy swapping.
#[derive(Clone)]
pub struct Backend {
    pub courses: Arc<dyn CourseBackend>,
    pub quizzes: Arc<dyn QuizBackend>,
}

impl Backend {
    /// Both halves served by one shared in-memory backend.
    #[must_use]
    pub fn in_memory(backend: InMemoryBackend) -> Self {
        let courses: Arc<dyn CourseBackend> = Arc::new(backend.clone());
        let quizzes: Arc<dyn QuizBackend> = Arc::new(backend);
        Self { courses, quizzes }
    }

    /// Both halves served by the HTTP adapter.
    #[must_use]
    pub fn http(backend: crate::http::HttpBackend) -> Self {
        let courses: Arc<dyn CourseBackend> = Arc::new(backend.clone());
        let quizzes: Arc<dyn QuizBackend> = Arc::new(backend);
        Self { courses, quizzes }
    }
}
