#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod courses;
pub mod error;
pub mod quizzes;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use config::{ClientConfig, ConfigOverrides};
pub use courses::{CourseService, CourseView, MarkOutcome};
pub use error::{AppServicesError, ConfigError, CourseServiceError, QuizServiceError};
pub use quizzes::{Countdown, QuizPhase, QuizRunner, QuizService};
