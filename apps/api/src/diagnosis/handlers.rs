use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::auth::middleware::MaybeSession;
use crate::auth::Session;
use crate::diagnosis::fallback::generic_fallback;
use crate::diagnosis::models::{Diagnosis, DiagnosisRequest};
use crate::diagnosis::orchestrator::generate_diagnosis;
use crate::diagnosis::DiagnosisError;
use crate::errors::AppError;
use crate::extract::DiagnosisJson;
use crate::models::history::SymptomHistoryEntry;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DiagnosisResponse {
    pub success: bool,
    pub data: Diagnosis,
    pub source: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<SymptomHistoryEntry>,
}

/// Error response for the diagnosis route: the usual error body plus a
/// generic low-confidence diagnosis the client can show instead.
pub struct DiagnosisFailure(pub AppError);

impl From<DiagnosisError> for DiagnosisFailure {
    fn from(err: DiagnosisError) -> Self {
        DiagnosisFailure(err.into())
    }
}

impl IntoResponse for DiagnosisFailure {
    fn into_response(self) -> Response {
        let (status, code) = self.0.status_and_code();
        let body = Json(json!({
            "success": false,
            "error": self.0.public_message(),
            "code": code,
            "fallback": generic_fallback(),
        }));
        (status, body).into_response()
    }
}

/// POST /api/v1/diagnosis
pub async fn handle_diagnosis(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    DiagnosisJson(req): DiagnosisJson<DiagnosisRequest>,
) -> Result<Json<DiagnosisResponse>, DiagnosisFailure> {
    let user_id = session.map(|s| s.user_id);
    let outcome =
        generate_diagnosis(state.diagnoser.as_ref(), &state.history, req, user_id).await?;

    Ok(Json(DiagnosisResponse {
        success: true,
        data: outcome.diagnosis,
        source: outcome.backend,
        timestamp: Utc::now(),
    }))
}

/// GET /api/v1/history (gated)
pub async fn handle_history(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<HistoryResponse>, AppError> {
    let data = state.repo.list_history(session.user_id).await?;
    Ok(Json(HistoryResponse {
        success: true,
        data,
    }))
}
