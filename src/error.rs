use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Message returned to callers for every upstream failure.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Which leaf call a failure came from. Only used for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Weather,
    Generation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Weather => "weather",
            Stage::Generation => "generation",
        }
    }
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("weather request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("weather provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed weather payload: {0}")]
    Payload(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("generation returned no usable text")]
    EmptyGeneration,
}

impl UpstreamError {
    pub fn stage(&self) -> Stage {
        match self {
            UpstreamError::Transport(_)
            | UpstreamError::Status { .. }
            | UpstreamError::Payload(_) => Stage::Weather,
            UpstreamError::Generation(_) | UpstreamError::EmptyGeneration => Stage::Generation,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request failed")]
    RequestFailed,
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RequestFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE.to_string(),
            ),
        };

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "error": error_message,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "error": error_message,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Cuts `s` to at most `max` bytes without splitting a character.
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, c)| i + c.len_utf8() <= max)
            .map(|(_, c)| c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_validation_error() {
        let error = AppError::Validation("latitude is required".to_string());
        assert_eq!(error.to_string(), "Validation error: latitude is required");
    }

    #[test]
    fn test_upstream_stage() {
        let cases = vec![
            (
                UpstreamError::Status {
                    status: 500,
                    body: "boom".to_string(),
                },
                Stage::Weather,
            ),
            (
                UpstreamError::Payload("missing field `weather`".to_string()),
                Stage::Weather,
            ),
            (
                UpstreamError::Generation("timed out".to_string()),
                Stage::Generation,
            ),
            (UpstreamError::EmptyGeneration, Stage::Generation),
        ];

        for (error, expected) in cases {
            assert_eq!(error.stage(), expected, "stage of {error}");
        }
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::Weather.as_str(), "weather");
        assert_eq!(Stage::Generation.as_str(), "generation");
    }

    #[tokio::test]
    async fn test_request_failed_is_generic() {
        let response = AppError::RequestFailed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], GENERIC_FAILURE);
        assert_eq!(body["status"], 500);
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let response = AppError::Validation("bad body".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "bad body");
    }

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let result = truncate("°C°C", 4);
        assert!(result.len() <= 3);
        assert_eq!(result, "°C");
    }
}
