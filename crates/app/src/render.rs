//! Plain-text presentation of course and quiz state.

use std::fmt::Write as _;

use course_core::attempt::{QuestionReview, QuizOutcome, QuizSession};
use course_core::model::{ContentItem, ContentKind, Quiz};
use course_core::time::format_countdown;
use services::CourseView;

fn check(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

fn kind_label(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Video => "video",
        ContentKind::Document => "document",
        ContentKind::Link => "link",
        ContentKind::Other => "other",
    }
}

fn content_line(out: &mut String, item: &ContentItem) {
    let marker = if item.locked { "[#]" } else { check(item.completed) };
    let _ = write!(out, "    {marker} {} {} ({})", item.id, item.title, kind_label(item.kind));
    if let Some(duration) = &item.duration {
        let _ = write!(out, " {duration}");
    }
    out.push('\n');
}

fn quiz_line(out: &mut String, quiz: &Quiz, indent: &str) {
    let status = if quiz.is_completed { "completed" } else { "open" };
    let _ = writeln!(
        out,
        "{indent}quiz {} {} ({} min, {status})",
        quiz.id,
        quiz.title,
        quiz.time_limit_minutes()
    );
}

#[must_use]
pub fn course(view: &CourseView) -> String {
    let course = view.course();
    let progress = view.progress();
    let mut out = String::new();

    let _ = writeln!(out, "{} (course {})", course.title, course.id);
    if let Some(instructor) = &course.instructor_name {
        let _ = writeln!(out, "by {instructor}");
    }
    let _ = writeln!(
        out,
        "Progress: {}% ({}/{} chapters)  Time spent: {}",
        progress.overall_progress,
        progress.chapters_completed,
        progress.total_chapters,
        progress.time_spent
    );
    if let Some(date) = progress.last_accessed {
        let _ = writeln!(out, "Last accessed: {date}");
    }

    for chapter in &course.chapters {
        let lock = if chapter.locked { " (locked)" } else { "" };
        let _ = writeln!(
            out,
            "  {} {} {}{lock}",
            check(chapter.completed),
            chapter.id,
            chapter.title
        );
        for item in &chapter.contents {
            content_line(&mut out, item);
        }
        if let Some(quiz) = &chapter.quiz {
            quiz_line(&mut out, quiz, "    ");
        }
    }

    if !course.final_quizzes.is_empty() {
        out.push_str("Final quizzes:\n");
        for quiz in &course.final_quizzes {
            quiz_line(&mut out, quiz, "  ");
        }
    }

    if view.certificate_prompt() {
        let _ = writeln!(
            out,
            "Course complete! Download your certificate with `campus certificate {}`.",
            course.id
        );
    }
    if course.has_rated {
        let _ = writeln!(out, "Your rating: {:.0}/5", course.rating);
    }
    out
}

#[must_use]
pub fn question(session: &QuizSession) -> String {
    let mut out = String::new();
    let Some(question) = session.current_question() else {
        out.push_str("This quiz has no questions. Type `s` to submit.\n");
        return out;
    };

    let flag = if session.is_flagged(question.id) { " [flagged]" } else { "" };
    let _ = writeln!(
        out,
        "\n{}{flag}  |  answered {}/{}  |  flagged {}  |  {} left",
        session.position_label(),
        session.answered_count(),
        session.total_questions(),
        session.flagged_count(),
        format_countdown(session.remaining_secs())
    );
    let _ = writeln!(out, "{}", question.text);
    let selected = session.selected(question.id);
    for (index, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(index) { '*' } else { ' ' };
        let _ = writeln!(out, " {marker} {}. {option}", index + 1);
    }
    out
}

#[must_use]
pub fn outcome(outcome: &QuizOutcome) -> String {
    let verdict = if outcome.passed { "passed" } else { "not passed" };
    format!(
        "Score: {}% ({}/{} correct), {verdict}. Time used: {}.\n",
        outcome.score,
        outcome.correct,
        outcome.total,
        format_countdown(outcome.time_used_secs)
    )
}

#[must_use]
pub fn review(reviews: &[QuestionReview]) -> String {
    let mut out = String::new();
    for (index, review) in reviews.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", index + 1, review.text);
        for (option_index, option) in review.options.iter().enumerate() {
            let label = option
                .mark
                .map(|mark| format!("  <- {}", mark.label()))
                .unwrap_or_default();
            let _ = writeln!(out, "   {}. {}{label}", option_index + 1, option.text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::attempt::{OptionMark, OptionReview, SubmitTrigger};
    use course_core::model::{
        Chapter, ChapterId, ContentId, Course, CourseId, QuestionId, QuizId,
    };
    use course_core::time::fixed_now;

    fn sample_course() -> Course {
        Course {
            id: CourseId::new(3),
            title: "Rust 101".into(),
            description: String::new(),
            instructor_name: None,
            chapters: vec![Chapter {
                id: ChapterId::new(1),
                title: "Intro".into(),
                duration: String::new(),
                completed: true,
                locked: false,
                contents: vec![ContentItem {
                    id: ContentId::new(4),
                    kind: ContentKind::Video,
                    url: String::new(),
                    title: "Welcome".into(),
                    duration: Some("3 min".into()),
                    completed: true,
                    locked: false,
                    course_id: None,
                    chapter_id: None,
                }],
                quiz: None,
            }],
            final_quizzes: Vec::new(),
            duration: "1h".into(),
            created_at: None,
            rating: 0.0,
            has_rated: false,
            is_premium: false,
            overall_progress: Some(100.0),
            chapters_completed_count: Some(1),
            en_id: None,
        }
    }

    #[test]
    fn course_outline_shows_progress_and_prompt() {
        let text = course(&CourseView::new(sample_course()));
        assert!(text.contains("Progress: 100% (1/1 chapters)  Time spent: 1h"));
        assert!(text.contains("[x] 4 Welcome (video) 3 min"));
        assert!(text.contains("campus certificate 3"));
    }

    #[test]
    fn review_labels_marks() {
        let text = review(&[QuestionReview {
            question_id: QuestionId::new(1),
            text: "Pick".into(),
            selected: Some(0),
            options: vec![
                OptionReview {
                    text: "a".into(),
                    mark: Some(OptionMark::YourAnswer),
                },
                OptionReview {
                    text: "b".into(),
                    mark: Some(OptionMark::Correct),
                },
            ],
        }]);
        assert!(text.contains("1. a  <- Votre réponse"));
        assert!(text.contains("2. b  <- Correct"));
    }

    #[test]
    fn outcome_line_reports_verdict() {
        let mut session = QuizSession::new(
            Quiz {
                id: QuizId::new(1),
                title: "Empty".into(),
                description: None,
                course_id: None,
                chapter_id: None,
                questions: Vec::new(),
                time_limit: None,
                is_completed: false,
            },
            fixed_now(),
        );
        assert!(question(&session).contains("no questions"));
        let result = session.submit(SubmitTrigger::Manual, fixed_now()).unwrap();
        assert_eq!(
            outcome(&result),
            "Score: 0% (0/0 correct), not passed. Time used: 0:00.\n"
        );
    }
}
