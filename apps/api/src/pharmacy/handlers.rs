use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::pharmacy::locator::{locate_pharmacies, PharmacyLookup, PharmacyRequest};
use crate::state::AppState;

/// POST /api/v1/pharmacy
pub async fn handle_pharmacy(
    State(state): State<AppState>,
    AppJson(req): AppJson<PharmacyRequest>,
) -> Result<Json<PharmacyLookup>, AppError> {
    Ok(Json(locate_pharmacies(&state.places, &req).await?))
}
