use axum::{extract::State, Json};

use crate::chat::{reply, ChatReply, ChatRequest};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    Ok(Json(reply(state.llm.as_ref(), &req).await?))
}
