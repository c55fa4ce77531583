//! Session extraction and route gating.
//!
//! - `MaybeSession`: extractor for routes that behave differently when signed in.
//! - `require_session`: middleware for gated routes; inserts the `Session`
//!   into request extensions or answers 401.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::session::token_from_headers;
use crate::auth::{AuthGate, Session};
use crate::errors::AppError;
use crate::state::AppState;

/// The current session, if the request carries a valid one.
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(resolve_session(&parts.headers, state).await))
    }
}

async fn resolve_session(headers: &axum::http::HeaderMap, state: &AppState) -> Option<Session> {
    let token = token_from_headers(headers)?;
    match state.auth.materialize(&token).await {
        Ok(session) => Some(session),
        Err(e) => {
            debug!("Ignoring session token: {e}");
            None
        }
    }
}

pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = resolve_session(request.headers(), &state).await;

    if !AuthGate::is_authorized(session.as_ref()) {
        return AppError::Unauthorized("Authentication required".to_string()).into_response();
    }

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}
