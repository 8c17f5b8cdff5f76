use std::fmt;

use course_core::completion::{
    Applied, CompletionError, CompletionTicket, CompletionTracker, MutationState,
};
use course_core::model::{ChapterId, ContentId, Course, Quiz, QuizId, RatingError, Stars};
use course_core::progress::{CertificateTrigger, CourseProgress};

use crate::error::CourseServiceError;

/// Client-side state for one opened course.
///
/// Holds the last fetched snapshot, the progress computed from it, and the
/// state of every mutation started from this view. Reloading replaces the
/// snapshot and invalidates outstanding completion tickets.
pub struct CourseView {
    course: Course,
    progress: CourseProgress,
    tracker: CompletionTracker,
    certificate: CertificateTrigger,
    certificate_prompt: bool,
    rating: MutationState,
}

impl CourseView {
    #[must_use]
    pub fn new(course: Course) -> Self {
        let progress = CourseProgress::from_course(&course);
        let mut certificate = CertificateTrigger::new();
        let certificate_prompt = certificate.observe(&progress);
        Self {
            course,
            progress,
            tracker: CompletionTracker::new(),
            certificate,
            certificate_prompt,
            rating: MutationState::Idle,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn progress(&self) -> &CourseProgress {
        &self.progress
    }

    /// Swap in a freshly fetched snapshot.
    ///
    /// Returns true if this snapshot fired the certificate prompt.
    pub fn replace(&mut self, course: Course) -> bool {
        self.progress = CourseProgress::from_course(&course);
        self.course = course;
        self.tracker.reset();
        self.rating = MutationState::Idle;

        let fired = self.certificate.observe(&self.progress);
        self.certificate_prompt |= fired;
        fired
    }

    // ─── Certificate ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn certificate_prompt(&self) -> bool {
        self.certificate_prompt
    }

    pub fn dismiss_certificate_prompt(&mut self) {
        self.certificate_prompt = false;
    }

    #[must_use]
    pub fn can_download_certificate(&self) -> bool {
        self.progress.is_complete() && self.course.en_id.is_some()
    }

    // ─── Completion ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn completion_state(&self, content_id: ContentId) -> &MutationState {
        self.tracker.state(content_id)
    }

    /// # Errors
    ///
    /// Returns `CompletionError` if the content cannot be completed right now.
    pub fn begin_completion(
        &mut self,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Result<CompletionTicket, CompletionError> {
        self.tracker.begin(&self.course, chapter_id, content_id)
    }

    pub fn confirm_completion(&mut self, ticket: &CompletionTicket) -> Applied {
        self.tracker.confirm(&mut self.course, ticket)
    }

    pub fn fail_completion(
        &mut self,
        ticket: &CompletionTicket,
        reason: impl Into<String>,
    ) -> Applied {
        self.tracker.fail(ticket, reason)
    }

    // ─── Rating ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn rating_state(&self) -> &MutationState {
        &self.rating
    }

    /// # Errors
    ///
    /// Returns `RatingError::AlreadyRated` once the course has a rating and
    /// `RatingError::InFlight` while a rating request is pending.
    pub fn begin_rating(&mut self) -> Result<(), RatingError> {
        if self.course.has_rated {
            return Err(RatingError::AlreadyRated);
        }
        if self.rating.is_pending() {
            return Err(RatingError::InFlight);
        }
        self.rating = MutationState::Pending;
        Ok(())
    }

    pub fn confirm_rating(&mut self, stars: Stars) {
        self.course.has_rated = true;
        self.course.rating = f64::from(stars.value());
        self.rating = MutationState::Confirmed;
    }

    pub fn fail_rating(&mut self, reason: impl Into<String>) {
        self.rating = MutationState::Failed(reason.into());
    }

    // ─── Quizzes ───────────────────────────────────────────────────────────────

    /// Look up a quiz to start an attempt.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::QuizNotFound` for a quiz outside this course
    /// and `CourseServiceError::QuizCompleted` once it has been passed.
    pub fn open_quiz(&self, quiz_id: QuizId) -> Result<&Quiz, CourseServiceError> {
        let quiz = self
            .course
            .quiz(quiz_id)
            .ok_or(CourseServiceError::QuizNotFound(quiz_id))?;
        if quiz.is_completed {
            return Err(CourseServiceError::QuizCompleted(quiz_id));
        }
        Ok(quiz)
    }
}

impl fmt::Debug for CourseView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourseView")
            .field("course_id", &self.course.id)
            .field("overall_progress", &self.progress.overall_progress)
            .field("generation", &self.tracker.generation())
            .field("certificate_prompt", &self.certificate_prompt)
            .finish_non_exhaustive()
    }
}
