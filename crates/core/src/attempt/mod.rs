//! A single timed quiz attempt, from first question to scored result.

mod review;
mod scoring;
mod session;

pub use review::{OptionMark, OptionReview, QuestionReview, review_question};
pub use scoring::{PASS_THRESHOLD, Score, score_answers};
pub use session::{QuizOutcome, QuizSession, QuizSessionError, SubmitTrigger, Tick};
