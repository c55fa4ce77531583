use std::sync::Arc;

use crate::auth::AuthGate;
use crate::diagnosis::diagnoser::Diagnoser;
use crate::diagnosis::history::HistoryWriter;
use crate::llm_client::LlmClient;
use crate::pharmacy::places::PlacesClient;
use crate::repository::Repository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub repo: Arc<dyn Repository>,
    /// Pluggable diagnoser. `LlmDiagnoser` with an API key, `KeywordDiagnoser` without.
    pub diagnoser: Arc<dyn Diagnoser>,
    pub history: HistoryWriter,
    /// `None` disables chat.
    pub llm: Option<LlmClient>,
    pub places: PlacesClient,
    pub auth: Arc<AuthGate>,
}
