//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use backend::{BackendError, HttpInitError};
use course_core::attempt::QuizSessionError;
use course_core::completion::CompletionError;
use course_core::model::{QuizId, RatingError};

/// Errors emitted by `CourseService` and `CourseView`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error("the certificate is only available once the course is complete")]
    CertificateUnavailable,
    #[error("the course has no enrollment to issue a certificate for")]
    NoEnrollment,
    #[error("quiz {0} is not part of this course")]
    QuizNotFound(QuizId),
    #[error("quiz {0} has already been completed")]
    QuizCompleted(QuizId),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz {0} is not running")]
    NotRunning(QuizId),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
}

/// Errors raised while resolving `ClientConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Http(#[from] HttpInitError),
}
