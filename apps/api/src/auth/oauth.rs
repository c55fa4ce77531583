//! Delegated identity: verifies a provider-issued token and returns the
//! profile the provider vouches for.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::auth::{AuthError, GoogleProviderConfig};

pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Identity asserted by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthProfile {
    pub provider: &'static str,
    pub subject: String,
    pub email: String,
    pub name: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn verify(&self, token: &str) -> Result<OAuthProfile, AuthError>;
}

/// Google sign-in: validates an ID token with the token-info endpoint.
pub struct GoogleIdentityProvider {
    client: Client,
    config: GoogleProviderConfig,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    // Google returns this as the string "true"/"false".
    email_verified: Option<String>,
    name: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleProviderConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            config,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn name(&self) -> &'static str {
        crate::auth::PROVIDER_GOOGLE
    }

    async fn verify(&self, token: &str) -> Result<OAuthProfile, AuthError> {
        let response = self
            .client
            .get(&self.config.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| AuthError::IdentityUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AuthError::IdentityRejected(format!(
                "token-info returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(AuthError::IdentityUnavailable(format!(
                "token-info returned {status}"
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::IdentityUnavailable(e.to_string()))?;

        if info.aud != self.config.client_id {
            warn!("Rejected Google token issued for another client: {}", info.aud);
            return Err(AuthError::IdentityRejected(
                "token was issued for a different client".to_string(),
            ));
        }

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AuthError::IdentityRejected("token carries no email".to_string()))?;

        if info.email_verified.as_deref() != Some("true") {
            return Err(AuthError::IdentityRejected(
                "email address is not verified".to_string(),
            ));
        }

        Ok(OAuthProfile {
            provider: self.name(),
            subject: info.sub,
            name: info.name.unwrap_or_default(),
            email,
        })
    }
}
