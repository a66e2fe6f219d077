use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::chart::ChartError;
use crate::narrative::NarrativeError;
use crate::report::ComposeError;
use crate::survey::SurveyError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Survey(#[from] SurveyError),

    #[error(transparent)]
    Narrative(#[from] NarrativeError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Everything a response body needs, derived from one error.
struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
    retryable: bool,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        ErrorBody {
            status,
            code,
            message,
            details: None,
            retryable: false,
        }
    }
}

impl AppError {
    fn body(&self) -> ErrorBody {
        match self {
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::PayloadTooLarge(msg) => {
                ErrorBody::new(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Survey(e) => survey_body(e),
            AppError::Narrative(NarrativeError::Parse(msg)) => {
                tracing::warn!("Diagnostic response rejected: {msg}");
                ErrorBody {
                    retryable: true,
                    ..ErrorBody::new(
                        StatusCode::BAD_GATEWAY,
                        "PARSE_ERROR",
                        "The generated diagnostic was malformed; regenerate the report".to_string(),
                    )
                }
            }
            AppError::Narrative(NarrativeError::Llm(e)) => {
                tracing::error!("LLM error: {e}");
                ErrorBody {
                    retryable: e.is_transient(),
                    ..ErrorBody::new(
                        StatusCode::BAD_GATEWAY,
                        "LLM_ERROR",
                        "The text-generation service failed".to_string(),
                    )
                }
            }
            AppError::Chart(ChartError::NoData) => ErrorBody::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_DATA",
                self.to_string(),
            ),
            AppError::Chart(e) => {
                tracing::error!("Chart error: {e}");
                ErrorBody::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The report chart could not be rendered".to_string(),
                )
            }
            AppError::Compose(e) => {
                tracing::error!("Compose error: {e}");
                ErrorBody::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The report document could not be produced".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {e}");
                ErrorBody::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ErrorBody::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

fn survey_body(e: &SurveyError) -> ErrorBody {
    let message = e.to_string();
    match e {
        SurveyError::UnsupportedFormat(_) => {
            ErrorBody::new(StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT", message)
        }
        SurveyError::Empty | SurveyError::Csv(_) | SurveyError::Spreadsheet(_) => {
            ErrorBody::new(StatusCode::BAD_REQUEST, "INVALID_FILE", message)
        }
        SurveyError::Schema(_) => ErrorBody::new(StatusCode::BAD_REQUEST, "SCHEMA_ERROR", message),
        SurveyError::Mapping { unresolved, .. } => ErrorBody {
            details: Some(json!({ "unresolved": unresolved })),
            ..ErrorBody::new(StatusCode::UNPROCESSABLE_ENTITY, "MAPPING_ERROR", message)
        },
        SurveyError::ClientNotFound(_) => {
            ErrorBody::new(StatusCode::NOT_FOUND, "CLIENT_NOT_FOUND", message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = self.body();

        let mut error = json!({
            "code": body.code,
            "message": body.message,
            "retryable": body.retryable,
        });
        if let Some(details) = body.details {
            error["details"] = details;
        }

        (body.status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_mapping_error_lists_identifiers() {
        let (status, body) = render(
            SurveyError::Mapping {
                message: "2 question(s) could not be mapped".to_string(),
                unresolved: vec!["Q98".to_string(), "Q99".to_string()],
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "MAPPING_ERROR");
        assert_eq!(body["error"]["details"]["unresolved"], json!(["Q98", "Q99"]));
        assert_eq!(body["error"]["retryable"], false);
    }

    #[tokio::test]
    async fn test_parse_error_is_retryable_bad_gateway() {
        let (status, body) =
            render(NarrativeError::Parse("missing required key 'ceo_moves'".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "PARSE_ERROR");
        assert_eq!(body["error"]["retryable"], true);
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (SurveyError::Schema("missing client column".into()).into(), StatusCode::BAD_REQUEST),
            (SurveyError::UnsupportedFormat("a.pdf".into()).into(), StatusCode::BAD_REQUEST),
            (SurveyError::ClientNotFound("Zeta".into()).into(), StatusCode::NOT_FOUND),
            (
                NarrativeError::Llm(LlmError::Api { status: 401, message: "bad key".into() }).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (ChartError::Render("boom".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::BadRequest("missing file".into()), StatusCode::BAD_REQUEST),
            (AppError::PayloadTooLarge("limit".into()), StatusCode::PAYLOAD_TOO_LARGE),
        ];
        for (err, expected) in cases {
            let (status, _) = render(err).await;
            assert_eq!(status, expected);
        }
    }
}
