use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use thiserror::Error;
use url::Url;

use crate::identity::IdentityProvider;
use crate::repository::BackendError;

mod courses;
mod quizzes;

/// REST adapter over the e-learning backend.
///
/// Bearer tokens come from the injected `IdentityProvider` and are resolved
/// once per request.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    identity: Arc<dyn IdentityProvider>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpInitError {
    #[error("invalid base url {raw}: {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Whether a request must carry a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Required,
    IfAvailable,
}

impl HttpBackend {
    /// Build an adapter rooted at `base_url` (e.g. `http://localhost:5135/api`).
    ///
    /// # Errors
    ///
    /// Returns `HttpInitError` if the URL does not parse or the client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, HttpInitError> {
        let mut parsed = Url::parse(base_url).map_err(|source| HttpInitError::InvalidUrl {
            raw: base_url.to_owned(),
            source,
        })?;
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
            identity,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(e.to_string()))
    }

    fn authorize(
        &self,
        request: RequestBuilder,
        auth: Auth,
    ) -> Result<RequestBuilder, BackendError> {
        match (self.identity.current_token(), auth) {
            (Some(token), _) => Ok(request.bearer_auth(token)),
            (None, Auth::IfAvailable) => Ok(request),
            (None, Auth::Required) => Err(BackendError::Unauthenticated),
        }
    }

    async fn send(&self, request: RequestBuilder, auth: Auth) -> Result<Response, BackendError> {
        let response = self.authorize(request, auth)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                url = %response.url(),
                "backend rejected request"
            );
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}
