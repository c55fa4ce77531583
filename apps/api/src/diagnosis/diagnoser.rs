//! Diagnoser backends, selected at startup.
//!
//! Default: `LlmDiagnoser` when an LLM API key is configured.
//! Without a key: `KeywordDiagnoser` (ordered keyword table, no network).
//!
//! `AppState` holds an `Arc<dyn Diagnoser>`.

use async_trait::async_trait;
use tracing::info;

use crate::diagnosis::fallback::keyword_diagnosis;
use crate::diagnosis::models::{Diagnosis, DiagnosisRequest};
use crate::diagnosis::prompts::{DIAGNOSIS_OPTIONS, DIAGNOSIS_PROMPT_TEMPLATE, DIAGNOSIS_SYSTEM};
use crate::diagnosis::DiagnosisError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NOT_SPECIFIED};
use crate::llm_client::LlmClient;

#[async_trait]
pub trait Diagnoser: Send + Sync {
    /// Produces a diagnosis for an already-validated request.
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<Diagnosis, DiagnosisError>;

    /// "llm" or "keyword", echoed to callers as `source`.
    fn backend(&self) -> &'static str;
}

/// Diagnosis through the completion API.
pub struct LlmDiagnoser(pub LlmClient);

#[async_trait]
impl Diagnoser for LlmDiagnoser {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<Diagnosis, DiagnosisError> {
        let prompt = build_prompt(request);
        let system = format!("{DIAGNOSIS_SYSTEM}\n\n{JSON_ONLY_SYSTEM}");

        let diagnosis: Diagnosis = self
            .0
            .call_json(&prompt, &system, &DIAGNOSIS_OPTIONS)
            .await?;

        info!(
            "Diagnosis generated: primary='{}', confidence={}, urgency={:?}",
            diagnosis.primary_diagnosis, diagnosis.confidence, diagnosis.urgency
        );
        Ok(diagnosis)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Offline diagnosis from the keyword table.
pub struct KeywordDiagnoser;

#[async_trait]
impl Diagnoser for KeywordDiagnoser {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<Diagnosis, DiagnosisError> {
        Ok(keyword_diagnosis(request))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

fn build_prompt(request: &DiagnosisRequest) -> String {
    let age = request
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    // User text goes in last so placeholders typed into it stay literal.
    DIAGNOSIS_PROMPT_TEMPLATE
        .replace("{age}", &age)
        .replace("{duration}", request.duration.as_str())
        .replace("{symptoms}", &request.symptoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::models::DurationBucket;

    #[test]
    fn test_prompt_includes_all_fields() {
        let prompt = build_prompt(&DiagnosisRequest {
            symptoms: "sore throat".to_string(),
            age: Some(42),
            duration: DurationBucket::ThreeToSevenDays,
        });
        assert!(prompt.contains("Symptoms: sore throat"));
        assert!(prompt.contains("Age: 42"));
        assert!(prompt.contains("Duration: 3-7 days"));
    }

    #[test]
    fn test_prompt_marks_missing_age() {
        let prompt = build_prompt(&DiagnosisRequest {
            symptoms: "sore throat".to_string(),
            age: None,
            duration: DurationBucket::default(),
        });
        assert!(prompt.contains("Age: Not specified"));
    }

    #[test]
    fn test_placeholders_in_symptoms_stay_literal() {
        let prompt = build_prompt(&DiagnosisRequest {
            symptoms: "rash since {duration}, I am {age}".to_string(),
            age: Some(42),
            duration: DurationBucket::OneToThreeDays,
        });
        assert!(prompt.contains("Symptoms: rash since {duration}, I am {age}"));
        assert!(prompt.contains("Age: 42"));
        assert!(prompt.contains("Duration: 1-3 days"));
    }

    #[tokio::test]
    async fn test_keyword_diagnoser_never_fails() {
        let diagnosis = KeywordDiagnoser
            .diagnose(&DiagnosisRequest {
                symptoms: "strange tingling".to_string(),
                age: None,
                duration: DurationBucket::default(),
            })
            .await
            .unwrap();
        assert_eq!(diagnosis.primary_diagnosis, "Common Cold");
        assert_eq!(KeywordDiagnoser.backend(), "keyword");
    }
}
