use anyhow::{Context, Result};

use crate::auth::{AuthConfig, GoogleProviderConfig};
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::pharmacy::places::DEFAULT_PLACES_BASE_URL;

/// Application configuration loaded from environment variables.
/// Only `AUTH_SECRET` is required; every external collaborator is optional
/// and the service degrades to its fallback path when one is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs against the in-memory repository.
    pub database_url: Option<String>,
    /// `None` selects the keyword diagnoser and disables chat.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub google_maps_api_key: Option<String>,
    pub places_base_url: String,
    pub auth: AuthConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let google = optional_env("GOOGLE_CLIENT_ID").map(|client_id| GoogleProviderConfig {
            client_id,
            tokeninfo_url: optional_env("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|| crate::auth::oauth::GOOGLE_TOKENINFO_URL.to_string()),
        });

        let auth = AuthConfig {
            session_secret: require_env("AUTH_SECRET")?,
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 24)?,
            credentials_enabled: parse_env("AUTH_CREDENTIALS_ENABLED", true)?,
            google,
            password_cost: bcrypt::DEFAULT_COST,
            cookie_secure: parse_env("COOKIE_SECURE", false)?,
        };

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: optional_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            google_maps_api_key: optional_env("GOOGLE_MAPS_API_KEY"),
            places_base_url: optional_env("PLACES_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PLACES_BASE_URL.to_string()),
            auth,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats unset and blank values the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
