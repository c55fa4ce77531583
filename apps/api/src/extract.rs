//! JSON body extractors whose rejections use the service's error body.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::diagnosis::handlers::DiagnosisFailure;
use crate::errors::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Like `AppJson`, but a bad body still gets the fallback diagnosis.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(DiagnosisFailure))]
pub struct DiagnosisJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

impl From<JsonRejection> for DiagnosisFailure {
    fn from(rejection: JsonRejection) -> Self {
        DiagnosisFailure(map_json_rejection(rejection))
    }
}

fn map_json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            match missing_field(&message) {
                Some(field) => AppError::Validation(format!("Missing required field: {field}")),
                None => AppError::Validation(format!("Invalid request body: {message}")),
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            AppError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        other => AppError::Validation(other.body_text()),
    }
}

fn missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let rest = message.get(start..)?;
    rest.get(..rest.find('`')?)
}
