// Chat passthrough: one completion per message, medical or general mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chat::prompts::{
    EMPTY_COMPLETION_REPLY, GENERAL_OPTIONS, GENERAL_SYSTEM, MEDICAL_OPTIONS,
    MEDICAL_PROMPT_TEMPLATE, MEDICAL_SYSTEM,
};
use crate::errors::AppError;
use crate::llm_client::prompts::MEDICAL_DISCLAIMER_INSTRUCTION;
use crate::llm_client::LlmClient;

pub mod handlers;
pub mod prompts;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_symptom_query: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Medical,
    General,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

/// Answers one chat message. `llm` is `None` when no API key is configured.
pub async fn reply(llm: Option<&LlmClient>, request: &ChatRequest) -> Result<ChatReply, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let llm = llm.ok_or_else(|| {
        AppError::ServiceUnavailable("Chat is not configured on this server".to_string())
    })?;

    let kind = if request.is_symptom_query {
        ChatKind::Medical
    } else {
        ChatKind::General
    };

    let text = match kind {
        ChatKind::Medical => {
            let system = format!("{MEDICAL_SYSTEM} {MEDICAL_DISCLAIMER_INSTRUCTION}");
            let prompt = MEDICAL_PROMPT_TEMPLATE.replace("{message}", message);
            llm.call_text(&prompt, &system, &MEDICAL_OPTIONS).await?
        }
        ChatKind::General => llm.call_text(message, GENERAL_SYSTEM, &GENERAL_OPTIONS).await?,
    };

    info!("Chat reply generated ({kind:?})");

    Ok(ChatReply {
        success: true,
        response: text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION_REPLY.to_string()),
        timestamp: Utc::now(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::llm_client::{completion_body, DEFAULT_MODEL};

    fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new("test-key".to_string(), server.uri(), DEFAULT_MODEL.to_string()).unwrap()
    }

    fn request(message: &str, is_symptom_query: bool) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            is_symptom_query,
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = reply(Some(&client_for(&server)), &request("  ", true))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_client_is_service_unavailable() {
        let err = reply(None, &request("hello", false)).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_medical_mode_uses_larger_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "max_tokens": 500 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("Rest and fluids.")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = reply(Some(&client_for(&server)), &request("sore throat", true))
            .await
            .unwrap();
        assert_eq!(out.kind, ChatKind::Medical);
        assert_eq!(out.response, "Rest and fluids.");
        assert_eq!(serde_json::to_value(&out).unwrap()["type"], json!("medical"));
    }

    #[tokio::test]
    async fn test_medical_prompt_keeps_braces_in_message() {
        let server = MockServer::start().await;
        let expected = MEDICAL_PROMPT_TEMPLATE.replace("{message}", "itchy {message} rash");
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": expected }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        reply(Some(&client_for(&server)), &request("itchy {message} rash", true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_general_mode_passes_message_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "max_tokens": 300,
                "messages": [
                    { "role": "system", "content": GENERAL_SYSTEM },
                    { "role": "user", "content": "what is ibuprofen?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("An NSAID.")))
            .expect(1)
            .mount(&server)
            .await;

        let out = reply(Some(&client_for(&server)), &request("what is ibuprofen?", false))
            .await
            .unwrap();
        assert_eq!(out.kind, ChatKind::General);
    }

    #[tokio::test]
    async fn test_empty_completion_gets_apology() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("")))
            .mount(&server)
            .await;

        let out = reply(Some(&client_for(&server)), &request("hi", false))
            .await
            .unwrap();
        assert_eq!(out.response, EMPTY_COMPLETION_REPLY);
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = reply(Some(&client_for(&server)), &request("hi", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
