use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::insight::batch::{BatchAborted, IngestError};
use crate::insight::invoker::CompletionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("CSV error: {0}")]
    Ingest(#[from] IngestError),

    #[error("LLM error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Batch aborted: {0}")]
    Batch(#[from] BatchAborted),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Status, code, and user-facing message for a failed completion call.
fn completion_parts(err: &CompletionError) -> (StatusCode, &'static str, String) {
    match err {
        CompletionError::MalformedResponse { reason, raw } => {
            tracing::error!("Malformed model response ({reason}). Raw:\n{raw}");
            (
                StatusCode::BAD_GATEWAY,
                "MALFORMED_RESPONSE",
                "The AI response was not valid JSON".to_string(),
            )
        }
        CompletionError::IncompleteResponse { missing, raw } => {
            tracing::error!("Model response missing keys {missing:?}. Raw:\n{raw}");
            (
                StatusCode::BAD_GATEWAY,
                "INCOMPLETE_RESPONSE",
                format!("The AI response is missing keys: {}", missing.join(", ")),
            )
        }
        CompletionError::Serialize(e) => {
            tracing::error!("Insight serialization error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            )
        }
        CompletionError::Llm(e) => {
            tracing::error!("LLM error: {e}");
            (
                StatusCode::BAD_GATEWAY,
                "LLM_ERROR",
                format!("The AI service call failed: {e}"),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ingest(e) => {
                let code = match e {
                    IngestError::EmptyHeader => "EMPTY_HEADER",
                    IngestError::MissingColumns { .. } => "MISSING_COLUMNS",
                    IngestError::NoRows => "NO_ROWS",
                    IngestError::Csv(_) => "INVALID_CSV",
                };
                (StatusCode::BAD_REQUEST, code, e.to_string())
            }
            AppError::Completion(e) => completion_parts(e),
            AppError::Batch(e) => {
                let (status, code, message) = completion_parts(&e.source);
                (
                    status,
                    code,
                    format!("Row {} ('{}'): {message}", e.row, e.company_name),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_serialization_failure_is_internal_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(CompletionError::from(source));
        let (status, code, message) = match &err {
            AppError::Completion(e) => completion_parts(e),
            other => panic!("expected Completion, got {other:?}"),
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("EOF"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_incomplete_response_is_bad_gateway() {
        let err = AppError::from(CompletionError::IncompleteResponse {
            missing: vec!["email_body".to_string()],
            raw: "{}".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
