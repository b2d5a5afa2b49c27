use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::documents::DocumentError;
use crate::generation::generator::GenerationError;
use crate::jobs::extraction::ExtractionAgentError;
use crate::jobs::scraper::ScrapeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionAgentError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Vec<String>>) {
        match self {
            AppError::Scrape(e @ ScrapeError::UnsupportedBoard(_)) => {
                (StatusCode::BAD_REQUEST, "unsupported_url", e.to_string(), None)
            }
            AppError::Scrape(e @ ScrapeError::Parse(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "scrape_parse_error",
                e.to_string(),
                None,
            ),
            AppError::Scrape(e @ ScrapeError::Fetch { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "scrape_failed",
                e.to_string(),
                None,
            ),
            AppError::Extraction(e) => {
                let details = e
                    .validation_issues()
                    .map(|issues| issues.iter().map(|i| i.detail()).collect());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "extraction_failed",
                    e.to_string(),
                    details,
                )
            }
            AppError::Generation(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "generation_failed",
                e.to_string(),
                None,
            ),
            AppError::Document(e @ DocumentError::UnsupportedType(_)) => {
                (StatusCode::BAD_REQUEST, "unsupported_file", e.to_string(), None)
            }
            AppError::Document(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "document_processing_failed",
                e.to_string(),
                None,
            ),
            AppError::MissingFile => {
                (StatusCode::BAD_REQUEST, "missing_file", self.to_string(), None)
            }
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone(), None)
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal server error occurred".to_string(),
                None,
            ),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!("{}: {:?}", code, self);
        }

        let mut body = json!({
            "error": code,
            "message": message,
        });
        if let (Some(details), Value::Object(map)) = (details, &mut body) {
            map.insert("details".to_string(), json!(details));
        }

        (status, Json(body)).into_response()
    }
}
