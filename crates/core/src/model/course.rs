use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ChapterId, ContentId, CourseId, EnrollmentId, QuizId};
use crate::model::null_as_default;
use crate::model::quiz::Quiz;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RatingError {
    #[error("rating must be between 1 and 5 stars, got {0}")]
    OutOfRange(u8),

    #[error("course has already been rated")]
    AlreadyRated,

    #[error("a rating request is already in flight")]
    InFlight,
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// Kind of learning unit inside a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Video,
    Document,
    Link,
    /// Any type string this client does not know how to present.
    #[serde(other)]
    Other,
}

/// A single learning unit (video, document, or external link).
///
/// Completion is monotonic: once `completed` is true the client never resets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentId,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locked: bool,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub chapter_id: Option<ChapterId>,
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// A titled subsection of a course.
///
/// `completed` is computed by the backend from the contents and the quiz; the
/// client never recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locked: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contents: Vec<ContentItem>,
    #[serde(default)]
    pub quiz: Option<Quiz>,
}

impl Chapter {
    #[must_use]
    pub fn content(&self, id: ContentId) -> Option<&ContentItem> {
        self.contents.iter().find(|item| item.id == id)
    }

    pub fn content_mut(&mut self, id: ContentId) -> Option<&mut ContentItem> {
        self.contents.iter_mut().find(|item| item.id == id)
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Read-only snapshot of a course as returned by `GET /courses/{id}/progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapters: Vec<Chapter>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub final_quizzes: Vec<Quiz>,
    /// Time-spent label, e.g. `"4h 30m"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_rated: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_premium: bool,
    /// Backend-computed completion percentage, when the backend supplies one.
    #[serde(default)]
    pub overall_progress: Option<f64>,
    #[serde(default)]
    pub chapters_completed_count: Option<u32>,
    #[serde(default)]
    pub en_id: Option<EnrollmentId>,
}

impl Course {
    #[must_use]
    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id == id)
    }

    pub fn chapter_mut(&mut self, id: ChapterId) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|chapter| chapter.id == id)
    }

    #[must_use]
    pub fn content(&self, chapter_id: ChapterId, content_id: ContentId) -> Option<&ContentItem> {
        self.chapter(chapter_id)?.content(content_id)
    }

    pub fn content_mut(
        &mut self,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Option<&mut ContentItem> {
        self.chapter_mut(chapter_id)?.content_mut(content_id)
    }

    /// Finds a quiz by id among chapter quizzes and final quizzes.
    #[must_use]
    pub fn quiz(&self, id: QuizId) -> Option<&Quiz> {
        self.chapters
            .iter()
            .filter_map(|chapter| chapter.quiz.as_ref())
            .chain(self.final_quizzes.iter())
            .find(|quiz| quiz.id == id)
    }

    /// Number of chapters the backend flagged as completed.
    #[must_use]
    pub fn completed_chapter_count(&self) -> u32 {
        let count = self.chapters.iter().filter(|c| c.completed).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn total_chapters(&self) -> u32 {
        u32::try_from(self.chapters.len()).unwrap_or(u32::MAX)
    }

    /// Date part of `created_at`.
    ///
    /// Accepts RFC 3339 timestamps and the offset-less ISO form the backend
    /// emits for local times. Returns `None` when absent or unparseable.
    #[must_use]
    pub fn last_accessed(&self) -> Option<NaiveDate> {
        let raw = self.created_at.as_deref()?.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.date_naive());
        }
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(at.date());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

//
// ─── RATING ────────────────────────────────────────────────────────────────────
//

/// A one-to-five star course rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stars(u8);

impl Stars {
    /// # Errors
    ///
    /// Returns `RatingError::OutOfRange` unless `value` is in `1..=5`.
    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
