use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::session::{removal_cookie, session_cookie, IssuedSession};
use crate::auth::Session;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSignInRequest {
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub issued: IssuedSession,
}

/// GET /api/auth/providers
pub async fn handle_providers(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "providers": state.auth.config().providers(),
    }))
}

/// POST /api/auth/signup
pub async fn handle_sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(req): AppJson<SignUpRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let issued = state
        .auth
        .sign_up(&req.email, &req.password, &req.full_name)
        .await?;
    Ok(with_cookie(&state, jar, issued))
}

/// POST /api/auth/signin
pub async fn handle_sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let issued = state
        .auth
        .sign_in_with_credentials(&req.email, &req.password)
        .await?;
    Ok(with_cookie(&state, jar, issued))
}

/// POST /api/auth/oauth/google
pub async fn handle_google_sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(req): AppJson<OAuthSignInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let issued = state.auth.sign_in_with_oauth(&req.id_token).await?;
    Ok(with_cookie(&state, jar, issued))
}

/// POST /api/auth/signout
pub async fn handle_sign_out(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (jar.remove(removal_cookie()), Json(json!({ "success": true })))
}

/// GET /api/auth/session (gated)
pub async fn handle_session(Extension(session): Extension<Session>) -> Json<Value> {
    Json(json!({ "success": true, "session": session }))
}

fn with_cookie(
    state: &AppState,
    jar: CookieJar,
    issued: IssuedSession,
) -> (CookieJar, Json<SessionResponse>) {
    let cookie = session_cookie(issued.token.clone(), state.auth.config().cookie_secure);
    (
        jar.add(cookie),
        Json(SessionResponse {
            success: true,
            issued,
        }),
    )
}
