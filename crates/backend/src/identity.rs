//! Identity context for user-scoped requests.
//!
//! The bearer token is a JWT issued by the backend. The client never verifies
//! its signature; it only reads the claims to know who is signed in.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token claims are invalid: {0}")]
    Claims(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Role {
    /// Learner.
    Eleve,
    /// Instructor.
    Enseignant,
    Admin,
    #[serde(other)]
    Other,
}

/// Claims carried by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

impl Identity {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Decode the claims of a JWT without checking its signature.
///
/// # Errors
///
/// Returns `IdentityError` when the token is not a JWT or its claims do not parse.
pub fn decode_token(token: &str) -> Result<Identity, IdentityError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(IdentityError::Malformed);
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Source of the current bearer token, resolved once per request.
pub trait IdentityProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;

    fn current_user(&self) -> Option<Identity> {
        self.current_token()
            .and_then(|token| decode_token(&token).ok())
    }
}

/// Identity fixed at construction time (from config or a CLI flag).
#[derive(Clone, Default)]
pub struct StaticIdentity {
    token: Option<String>,
}

impl StaticIdentity {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_token(&self) -> Option<String> {
        self.token.clone()
    }
}

impl std::fmt::Debug for StaticIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticIdentity")
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_for(claims: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn decodes_student_claims() {
        let token = token_for(r#"{"id":"u-1","name":"Lina","role":"Eleve","exp":1700000100}"#);
        let identity = decode_token(&token).unwrap();

        assert_eq!(identity.id, "u-1");
        assert_eq!(identity.name, "Lina");
        assert_eq!(identity.role, Role::Eleve);
        assert!(!identity.is_expired(DateTime::from_timestamp(1_700_000_000, 0).unwrap()));
        assert!(identity.is_expired(DateTime::from_timestamp(1_700_000_100, 0).unwrap()));
    }

    #[test]
    fn unknown_role_is_other() {
        let token = token_for(r#"{"id":"1","name":"X","role":"Parent","exp":0}"#);
        assert_eq!(decode_token(&token).unwrap().role, Role::Other);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(decode_token("abc"), Err(IdentityError::Malformed)));
        assert!(matches!(decode_token("a.b.c.d"), Err(IdentityError::Malformed)));
        assert!(matches!(
            decode_token("a.!!!.c"),
            Err(IdentityError::Encoding(_))
        ));
    }

    #[test]
    fn static_identity_ignores_blank_tokens() {
        assert_eq!(StaticIdentity::new(Some("  ".into())).current_token(), None);
        assert_eq!(StaticIdentity::anonymous().current_user(), None);

        let token = token_for(r#"{"id":"7","name":"Ada","role":"Admin","exp":10}"#);
        let provider = StaticIdentity::new(Some(token.clone()));
        assert_eq!(provider.current_token(), Some(token));
        assert_eq!(provider.current_user().unwrap().role, Role::Admin);
    }
}
