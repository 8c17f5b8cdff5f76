mod countdown;
mod runner;
mod service;

pub use countdown::Countdown;
pub use runner::{QuizPhase, QuizRunner};
pub use service::QuizService;
