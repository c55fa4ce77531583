// Diagnosis LLM prompt templates.
// All prompts for the diagnosis module are defined here.

use crate::llm_client::CompletionOptions;

/// Low temperature keeps repeated submissions consistent.
pub const DIAGNOSIS_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 1000,
    temperature: 0.3,
    json_mode: true,
};

pub const DIAGNOSIS_SYSTEM: &str = r#"You are an AI medical assistant that provides diagnostic analysis based on symptoms, age, and duration. Return the diagnosis in a structured JSON format with the following schema:

{
  "primaryDiagnosis": "string",
  "confidence": "number (0-100)",
  "differentialDiagnoses": ["string", "string", "string"],
  "recommendedTests": ["string", "string"],
  "treatmentOptions": ["string", "string"],
  "urgency": "low|medium|high",
  "notes": "string"
}

Provide a comprehensive diagnostic analysis based on the symptoms, patient age, and duration of symptoms."#;

/// Replace `{symptoms}`, `{age}` and `{duration}` before sending.
pub const DIAGNOSIS_PROMPT_TEMPLATE: &str = "Analyze the following patient information to provide a diagnostic assessment:

Symptoms: {symptoms}
Age: {age}
Duration: {duration}";
