use std::sync::Arc;

use backend::{Backend, HttpBackend, Identity, IdentityProvider, InMemoryBackend, StaticIdentity};

use crate::config::ClientConfig;
use crate::courses::CourseService;
use crate::error::AppServicesError;
use crate::quizzes::QuizService;
use crate::Clock;

/// Assembles the front-end facing services over one backend.
#[derive(Clone)]
pub struct AppServices {
    identity: Arc<dyn IdentityProvider>,
    courses: Arc<CourseService>,
    quizzes: Arc<QuizService>,
}

impl AppServices {
    /// Build services backed by the REST API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(StaticIdentity::new(config.token.clone()));
        let http = HttpBackend::new(&config.base_url, config.timeout(), Arc::clone(&identity))?;
        tracing::debug!(base_url = %http.base_url(), "using http backend");
        Ok(Self::with_backend(Backend::http(http), identity, clock))
    }

    /// Build services over an in-memory backend.
    #[must_use]
    pub fn in_memory(backend: InMemoryBackend, clock: Clock) -> Self {
        Self::with_backend(
            Backend::in_memory(backend),
            Arc::new(StaticIdentity::anonymous()),
            clock,
        )
    }

    #[must_use]
    pub fn with_backend(
        backend: Backend,
        identity: Arc<dyn IdentityProvider>,
        clock: Clock,
    ) -> Self {
        Self {
            identity,
            courses: Arc::new(CourseService::new(backend.courses)),
            quizzes: Arc::new(QuizService::new(clock, backend.quizzes)),
        }
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    /// Claims of the signed-in user, if a readable token is configured.
    #[must_use]
    pub fn current_user(&self) -> Option<Identity> {
        self.identity.current_user()
    }
}
