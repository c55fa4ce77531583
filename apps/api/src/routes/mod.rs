pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::{handlers as auth, middleware::require_session};
use crate::chat::handlers::handle_chat;
use crate::diagnosis::handlers::{handle_diagnosis, handle_history};
use crate::pharmacy::handlers::handle_pharmacy;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Routes that answer 401 without a session
    let gated = Router::new()
        .route("/api/v1/history", get(handle_history))
        .route("/api/auth/session", get(auth::handle_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/diagnosis", post(handle_diagnosis))
        .route("/api/v1/pharmacy", post(handle_pharmacy))
        .route("/api/v1/chat", post(handle_chat))
        .route("/api/auth/providers", get(auth::handle_providers))
        .route("/api/auth/signup", post(auth::handle_sign_up))
        .route("/api/auth/signin", post(auth::handle_sign_in))
        .route("/api/auth/oauth/google", post(auth::handle_google_sign_in))
        .route("/api/auth/signout", post(auth::handle_sign_out))
        .merge(gated)
        .with_state(state)
}
