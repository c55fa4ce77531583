//! Session tokens: HS256 JWTs carried in the `session` cookie or an
//! `Authorization: Bearer` header.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthError, Session};
use crate::models::user::User;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// A freshly signed session, ready to hand to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub session: Session,
}

pub fn sign_session(user: &User, secret: &str, ttl_hours: i64) -> Result<IssuedSession, AuthError> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        name: user.full_name.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(IssuedSession {
        token,
        expires_at,
        session: claims.into(),
    })
}

/// Verifies signature and expiry.
pub fn verify_session_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidSession)
}

/// Reads the session token from the bearer header, falling back to the cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Browser-session cookie; expiry is enforced by the token's own `exp` claim.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "sam@example.com".to_string(),
            full_name: "Sam".to_string(),
            password_hash: None,
            oauth_provider: None,
            oauth_subject: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_signed_token_verifies_with_same_secret() {
        let user = user();
        let issued = sign_session(&user, "secret-a", 1).unwrap();
        let claims = verify_session_token(&issued.token, "secret-a").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "sam@example.com");
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let issued = sign_session(&user(), "secret-a", 1).unwrap();
        assert!(matches!(
            verify_session_token(&issued.token, "secret-b"),
            Err(AuthError::InvalidSession)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = sign_session(&user(), "secret-a", -2).unwrap();
        assert!(verify_session_token(&issued.token, "secret-a").is_err());
    }

    #[test]
    fn test_bearer_header_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=from-cookie"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=abc"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_no_token_without_header_or_cookie() {
        assert!(token_from_headers(&HeaderMap::new()).is_none());
    }
}
