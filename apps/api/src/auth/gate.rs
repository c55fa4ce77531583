use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::oauth::{GoogleIdentityProvider, IdentityProvider};
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::auth::session::{sign_session, verify_session_token, IssuedSession};
use crate::auth::{AuthConfig, AuthError, Session, PROVIDER_CREDENTIALS, PROVIDER_GOOGLE};
use crate::models::user::{normalize_email, NewUser, User};
use crate::repository::{DuplicateEmail, Repository};

/// Signs users in and turns session tokens back into sessions.
pub struct AuthGate {
    config: AuthConfig,
    repo: Arc<dyn Repository>,
    google: Option<Arc<dyn IdentityProvider>>,
    /// Checked against when there is no stored hash, so a failed sign-in
    /// costs the same whether or not the account exists.
    dummy_hash: String,
}

impl AuthGate {
    /// Wires the providers named in `config`.
    pub fn new(config: AuthConfig, repo: Arc<dyn Repository>) -> anyhow::Result<Self> {
        let google = match &config.google {
            Some(google) => Some(
                Arc::new(GoogleIdentityProvider::new(google.clone())?) as Arc<dyn IdentityProvider>
            ),
            None => None,
        };
        let dummy_hash = hash_password("no-such-account", config.password_cost)?;
        info!("Auth gate ready (providers: {:?})", config.providers());
        Ok(Self {
            config,
            repo,
            google,
            dummy_hash,
        })
    }

    /// Replaces the Google identity provider.
    #[cfg(test)]
    pub fn with_google(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.google = Some(provider);
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The single route-gating rule: a session is present.
    pub fn is_authorized(session: Option<&Session>) -> bool {
        session.is_some()
    }

    /// Creates a credentials account and signs it in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<IssuedSession, AuthError> {
        if !self.config.credentials_enabled {
            return Err(AuthError::ProviderDisabled(PROVIDER_CREDENTIALS));
        }
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password, self.config.password_cost)?;
        let user = self
            .repo
            .create_user(NewUser {
                email,
                full_name: full_name.trim().to_string(),
                password_hash: Some(password_hash),
                oauth_provider: None,
                oauth_subject: None,
            })
            .await
            .map_err(|e| {
                if e.downcast_ref::<DuplicateEmail>().is_some() {
                    AuthError::EmailTaken
                } else {
                    AuthError::Storage(e)
                }
            })?;

        self.issue(&user)
    }

    /// Email/password sign-in. Accounts without a password never match.
    pub async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthError> {
        if !self.config.credentials_enabled {
            return Err(AuthError::ProviderDisabled(PROVIDER_CREDENTIALS));
        }
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.repo.find_user_by_email(&email).await?;
        let stored = user.as_ref().and_then(|u| u.password_hash.as_deref());

        let has_password = stored.is_some();
        let matched = verify_password(password, stored.unwrap_or(&self.dummy_hash));
        match user {
            Some(user) if matched && has_password => self.issue(&user),
            _ => {
                warn!("Failed credentials sign-in for {email}");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Trusts the identity provider and provisions a local user on first login.
    pub async fn sign_in_with_oauth(&self, id_token: &str) -> Result<IssuedSession, AuthError> {
        let provider = self
            .google
            .as_ref()
            .ok_or(AuthError::ProviderDisabled(PROVIDER_GOOGLE))?;
        if id_token.trim().is_empty() {
            return Err(AuthError::Validation("idToken is required".to_string()));
        }

        let profile = provider.verify(id_token.trim()).await?;
        let email = normalize_email(&profile.email);

        let user = match self.repo.find_user_by_email(&email).await? {
            Some(existing) => existing,
            None => {
                info!("Provisioning {} user {email}", profile.provider);
                self.repo
                    .create_user(NewUser {
                        email,
                        full_name: profile.name,
                        password_hash: None,
                        oauth_provider: Some(profile.provider.to_string()),
                        oauth_subject: Some(profile.subject),
                    })
                    .await?
            }
        };

        self.issue(&user)
    }

    /// Turns a token into a session, re-reading the user so the id is current.
    pub async fn materialize(&self, token: &str) -> Result<Session, AuthError> {
        let claims = verify_session_token(token, &self.config.session_secret)?;

        match self.repo.find_user_by_email(&claims.email).await {
            Ok(Some(user)) => Ok(Session {
                user_id: user.id,
                email: user.email,
                name: user.full_name,
            }),
            Ok(None) => Err(AuthError::InvalidSession),
            Err(e) => {
                warn!("Session refresh failed, using token claims: {e:#}");
                Ok(claims.into())
            }
        }
    }

    fn issue(&self, user: &User) -> Result<IssuedSession, AuthError> {
        sign_session(
            user,
            &self.config.session_secret,
            self.config.session_ttl_hours,
        )
    }
}
