use std::sync::Arc;

use backend::{BackendError, CourseBackend};
use course_core::completion::{Applied, CompletionError, CompletionTicket};
use course_core::model::{ChapterId, ContentId, CourseId, Stars};

use super::view::CourseView;
use crate::error::CourseServiceError;

/// Result of a successful `mark_content_complete` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Completed,
    /// Nothing was sent; the item was already done.
    AlreadyCompleted,
    /// The backend accepted the request but the view was reloaded meanwhile.
    Stale,
}

/// Loads course snapshots and runs course-level mutations against a view.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseBackend>,
}

impl CourseService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseBackend>) -> Self {
        Self { courses }
    }

    /// Fetch a course and build its view.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Backend` if the snapshot cannot be fetched.
    pub async fn load(&self, course_id: CourseId) -> Result<CourseView, CourseServiceError> {
        let course = self
            .courses
            .course_progress(course_id)
            .await
            .inspect_err(|err| {
                tracing::error!(%course_id, error = %err, "failed to load course");
            })?;

        let view = CourseView::new(course);
        tracing::debug!(
            %course_id,
            overall_progress = view.progress().overall_progress,
            source = ?view.progress().source,
            "course loaded"
        );
        if view.certificate_prompt() {
            tracing::info!(%course_id, "course complete, certificate available");
        }
        Ok(view)
    }

    /// Refetch the snapshot behind `view`. On failure the view is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Backend` if the snapshot cannot be fetched.
    pub async fn reload(&self, view: &mut CourseView) -> Result<(), CourseServiceError> {
        let course_id = view.course().id;
        let course = self
            .courses
            .course_progress(course_id)
            .await
            .inspect_err(|err| {
                tracing::error!(%course_id, error = %err, "failed to reload course");
            })?;

        if view.replace(course) {
            tracing::info!(%course_id, "course complete, certificate available");
        }
        Ok(())
    }

    /// Mark one content item complete.
    ///
    /// Already-completed items are a no-op and send nothing. On failure the
    /// item stays incomplete and can be retried.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Completion` for unknown, locked or in-flight
    /// content and `CourseServiceError::Backend` if the request fails.
    pub async fn mark_content_complete(
        &self,
        view: &mut CourseView,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Result<MarkOutcome, CourseServiceError> {
        let ticket = match view.begin_completion(chapter_id, content_id) {
            Ok(ticket) => ticket,
            Err(CompletionError::AlreadyCompleted(_)) => {
                tracing::debug!(%content_id, "content already completed");
                return Ok(MarkOutcome::AlreadyCompleted);
            }
            Err(err) => return Err(err.into()),
        };

        match self.send_completion(view.course().id, &ticket).await {
            Ok(()) => match view.confirm_completion(&ticket) {
                Applied::Applied => {
                    tracing::info!(%chapter_id, %content_id, "content marked complete");
                    Ok(MarkOutcome::Completed)
                }
                Applied::Stale => Ok(MarkOutcome::Stale),
            },
            Err(err) => {
                tracing::warn!(
                    %chapter_id,
                    %content_id,
                    error = %err,
                    "failed to mark content complete"
                );
                view.fail_completion(&ticket, err.to_string());
                Err(err.into())
            }
        }
    }

    /// Send the completion request for a ticket without touching any view.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request fails.
    pub async fn send_completion(
        &self,
        course_id: CourseId,
        ticket: &CompletionTicket,
    ) -> Result<(), BackendError> {
        self.courses
            .complete_content(course_id, ticket.chapter_id, ticket.content_id)
            .await
    }

    /// Rate the course once with 1 to 5 stars.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Rating` for an invalid or repeated rating
    /// and `CourseServiceError::Backend` if the request fails.
    pub async fn rate(&self, view: &mut CourseView, stars: u8) -> Result<(), CourseServiceError> {
        let stars = Stars::new(stars)?;
        view.begin_rating()?;

        let course_id = view.course().id;
        match self.courses.rate_course(course_id, stars).await {
            Ok(()) => {
                view.confirm_rating(stars);
                tracing::info!(%course_id, stars = stars.value(), "course rated");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%course_id, error = %err, "failed to rate course");
                view.fail_rating(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Download the completion certificate as PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::CertificateUnavailable` before the course
    /// is complete, `CourseServiceError::NoEnrollment` without an enrollment
    /// id, and `CourseServiceError::Backend` if the download fails.
    pub async fn download_certificate(
        &self,
        view: &CourseView,
    ) -> Result<Vec<u8>, CourseServiceError> {
        if !view.progress().is_complete() {
            return Err(CourseServiceError::CertificateUnavailable);
        }
        let enrollment_id = view.course().en_id.ok_or(CourseServiceError::NoEnrollment)?;

        let pdf = self
            .courses
            .certificate(enrollment_id)
            .await
            .inspect_err(|err| {
                tracing::warn!(%enrollment_id, error = %err, "failed to download certificate");
            })?;
        tracing::info!(%enrollment_id, bytes = pdf.len(), "certificate downloaded");
        Ok(pdf)
    }
}
