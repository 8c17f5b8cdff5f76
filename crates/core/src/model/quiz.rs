use serde::{Deserialize, Serialize};

use crate::model::ids::{ChapterId, CourseId, QuestionId, QuizId};
use crate::model::null_as_default;

/// Time limit applied when the backend omits `timeLimit` (or sends zero).
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 15;

/// A single-answer multiple choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    /// 0-based index into `options`.
    pub correct_option_index: usize,
    #[serde(default)]
    pub quiz_id: Option<QuizId>,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_option_index
    }

    #[must_use]
    pub fn has_option(&self, index: usize) -> bool {
        index < self.options.len()
    }
}

/// A chapter quiz or, when `chapter_id` is `None`, a final course quiz.
///
/// Course snapshots embed quizzes without their questions; `GET /Quizz/{id}`
/// returns them in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub chapter_id: Option<ChapterId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
    /// Minutes allowed for an attempt.
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_completed: bool,
}

impl Quiz {
    /// True for course-level quizzes that are not attached to a chapter.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.chapter_id.is_none()
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_TIME_LIMIT_MINUTES)
    }

    /// Seconds the countdown starts from.
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_minutes().saturating_mul(60)
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
