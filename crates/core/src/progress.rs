//! Course progress aggregation.
//!
//! `CourseProgress::from_course` is the only place a completion percentage is
//! derived from a course snapshot; every view reads it from here.

use chrono::NaiveDate;

use crate::model::Course;

/// Where the overall percentage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSource {
    /// The snapshot carried `overallProgress`.
    Backend,
    /// Computed from chapter completion flags.
    Derived,
}

/// Completion summary for one course, recomputed on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseProgress {
    /// Whole percentage for display. Never 100 unless the course is complete.
    pub overall_progress: u8,
    /// The backend's `overallProgress` exactly as received.
    pub reported_progress: Option<f64>,
    pub chapters_completed: u32,
    pub total_chapters: u32,
    pub time_spent: String,
    pub last_accessed: Option<NaiveDate>,
    pub source: ProgressSource,
    complete: bool,
}

impl CourseProgress {
    /// Derive progress from a course snapshot.
    ///
    /// A backend-supplied percentage wins; otherwise the share of completed
    /// chapters is used, and an empty chapter list yields 0.
    ///
    /// A backend value counts as complete only when it is exactly `100.0`; a
    /// value like `99.6` displays as 99. A derived percentage is complete when
    /// it rounds to 100.
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        let total_chapters = course.total_chapters();
        let last_accessed = course.last_accessed();

        match course.overall_progress.filter(|value| value.is_finite()) {
            Some(value) => {
                #[allow(clippy::float_cmp)]
                let complete = value == 100.0;
                let shown = clamp_percent(value);
                Self {
                    overall_progress: if complete { 100 } else { shown.min(99) },
                    reported_progress: Some(value),
                    chapters_completed: course
                        .chapters_completed_count
                        .unwrap_or(0)
                        .min(total_chapters),
                    total_chapters,
                    time_spent: course.duration.clone(),
                    last_accessed,
                    source: ProgressSource::Backend,
                    complete,
                }
            }
            None => {
                let completed = course.completed_chapter_count().min(total_chapters);
                let overall_progress = percent(completed, total_chapters);
                Self {
                    overall_progress,
                    reported_progress: None,
                    chapters_completed: completed,
                    total_chapters,
                    time_spent: "0h".to_owned(),
                    last_accessed,
                    source: ProgressSource::Derived,
                    complete: overall_progress == 100,
                }
            }
        }
    }

    /// True only when progress is exactly 100.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// `round(100 × part / whole)`, 0 when `whole` is 0.
#[must_use]
pub fn percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let ratio = f64::from(part.min(whole)) / f64::from(whole);
    clamp_percent(ratio * 100.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// One-shot detector for the "course complete" signal.
///
/// Fires the first time it observes a complete course, whether that happens
/// on the initial load or on a later reload; never fires twice.
#[derive(Debug, Clone, Default)]
pub struct CertificateTrigger {
    fired: bool,
}

impl CertificateTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this observation fires the signal.
    pub fn observe(&mut self, progress: &CourseProgress) -> bool {
        if self.fired || !progress.is_complete() {
            return false;
        }
        self.fired = true;
        true
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
