// Diagnosis flow: validate input → diagnoser backend → optional history write.
// All LLM calls go through llm_client, never straight to the completion API.

use thiserror::Error;

use crate::errors::AppError;
use crate::llm_client::LlmError;

pub mod diagnoser;
pub mod fallback;
pub mod handlers;
pub mod history;
pub mod models;
pub mod orchestrator;
pub mod prompts;

/// Why a diagnosis could not be produced. Each variant maps to a distinct
/// response code so callers can tell bad input, a down service and a garbage
/// answer apart.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("{0}")]
    Validation(String),

    #[error("Error generating diagnosis: {0}")]
    Upstream(String),

    #[error("Failed to parse diagnosis JSON: {0}")]
    Parse(String),
}

impl From<LlmError> for DiagnosisError {
    fn from(err: LlmError) -> Self {
        if err.is_parse_failure() {
            DiagnosisError::Parse(err.to_string())
        } else {
            DiagnosisError::Upstream(err.to_string())
        }
    }
}

impl From<DiagnosisError> for AppError {
    fn from(err: DiagnosisError) -> Self {
        match err {
            DiagnosisError::Validation(msg) => AppError::Validation(msg),
            DiagnosisError::Upstream(msg) => AppError::Upstream(msg),
            DiagnosisError::Parse(msg) => AppError::UpstreamParse(msg),
        }
    }
}
