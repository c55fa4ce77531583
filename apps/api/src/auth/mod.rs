//! Authentication gate: OAuth sign-in, credentials sign-in, sessions and
//! route gating.
//!
//! All provider wiring lives in `AuthConfig`, built once at startup and handed
//! to `AuthGate::new`. Nothing here reads the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;

pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod oauth;
pub mod password;
pub mod session;

pub use gate::AuthGate;

pub const PROVIDER_CREDENTIALS: &str = "credentials";
pub const PROVIDER_GOOGLE: &str = "google";

#[derive(Debug, Clone)]
pub struct GoogleProviderConfig {
    pub client_id: String,
    pub tokeninfo_url: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for session tokens.
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub credentials_enabled: bool,
    /// `None` disables Google sign-in.
    pub google: Option<GoogleProviderConfig>,
    pub password_cost: u32,
    /// Adds `Secure` to the session cookie.
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Names of the sign-in paths enabled by this configuration.
    pub fn providers(&self) -> Vec<&'static str> {
        let mut providers = Vec::new();
        if self.google.is_some() {
            providers.push(PROVIDER_GOOGLE);
        }
        if self.credentials_enabled {
            providers.push(PROVIDER_CREDENTIALS);
        }
        providers
    }
}

/// The signed-in user, as seen by handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Sign-in provider '{0}' is not enabled")]
    ProviderDisabled(&'static str),

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Identity provider rejected the token: {0}")]
    IdentityRejected(String),

    #[error("Identity provider unavailable: {0}")]
    IdentityUnavailable(String),

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => AppError::Validation(msg),
            AuthError::InvalidCredentials
            | AuthError::IdentityRejected(_)
            | AuthError::InvalidSession => AppError::Unauthorized(err.to_string()),
            AuthError::ProviderDisabled(_) => AppError::NotFound(err.to_string()),
            AuthError::EmailTaken => AppError::Conflict(err.to_string()),
            AuthError::IdentityUnavailable(msg) => AppError::Upstream(msg),
            AuthError::Hash(_) | AuthError::Token(_) => {
                AppError::Internal(anyhow::anyhow!(err.to_string()))
            }
            AuthError::Storage(e) => AppError::Internal(e),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        session_secret: "test-session-secret".to_string(),
        session_ttl_hours: 1,
        credentials_enabled: true,
        google: None,
        password_cost: 4,
        cookie_secure: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_reflect_config() {
        let mut config = test_config();
        assert_eq!(config.providers(), vec![PROVIDER_CREDENTIALS]);

        config.google = Some(GoogleProviderConfig {
            client_id: "client".to_string(),
            tokeninfo_url: "http://localhost/tokeninfo".to_string(),
        });
        config.credentials_enabled = false;
        assert_eq!(config.providers(), vec![PROVIDER_GOOGLE]);
    }

    #[test]
    fn test_invalid_credentials_maps_to_unauthorized() {
        let app: AppError = AuthError::InvalidCredentials.into();
        assert!(matches!(app, AppError::Unauthorized(_)));
    }
}
