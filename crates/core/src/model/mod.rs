use serde::{Deserialize, Deserializer};

mod course;
mod ids;
mod quiz;

pub use ids::{ChapterId, ContentId, CourseId, EnrollmentId, ParseIdError, QuestionId, QuizId};

pub use course::{Chapter, ContentItem, ContentKind, Course, RatingError, Stars};
pub use quiz::{DEFAULT_TIME_LIMIT_MINUTES, Question, Quiz};

/// Deserializes an explicit `null` as `T::default()`.
///
/// Pair with `#[serde(default)]` so a missing key behaves the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
