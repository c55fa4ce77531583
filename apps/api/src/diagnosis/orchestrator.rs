//! Diagnosis orchestration.
//!
//! Flow: validate → diagnoser → (signed in) spawn history write → return.
//! Validation failures return before any network call.

use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::diagnosis::diagnoser::Diagnoser;
use crate::diagnosis::history::HistoryWriter;
use crate::diagnosis::models::{Diagnosis, DiagnosisRequest};
use crate::diagnosis::DiagnosisError;
use crate::models::history::NewHistoryEntry;

pub struct DiagnosisOutcome {
    pub diagnosis: Diagnosis,
    pub backend: &'static str,
    /// Present when a history write was started. Callers normally drop it.
    pub history_write: Option<JoinHandle<()>>,
}

pub async fn generate_diagnosis(
    diagnoser: &dyn Diagnoser,
    history: &HistoryWriter,
    request: DiagnosisRequest,
    user_id: Option<Uuid>,
) -> Result<DiagnosisOutcome, DiagnosisError> {
    let request = request.validate()?;

    let diagnosis = diagnoser.diagnose(&request).await?;

    let history_write = user_id.map(|user_id| {
        info!("Recording diagnosis in history for user {user_id}");
        history.record(NewHistoryEntry {
            user_id,
            symptoms: request.symptoms.clone(),
            age: request.age,
            duration: request.duration,
            diagnosis: diagnosis.clone(),
        })
    });

    Ok(DiagnosisOutcome {
        diagnosis,
        backend: diagnoser.backend(),
        history_write,
    })
}
