use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct TextExtractionResponse {
    pub text: String,
    pub filename: String,
}

/// POST /extract-cv-text
///
/// Accepts a multipart upload (field `file`) holding a PDF, DOCX or TXT CV.
pub async fn handle_extract_cv_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TextExtractionResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
        upload = Some((filename, content_type, data));
        break;
    }

    let (filename, content_type, data) = upload.ok_or(AppError::MissingFile)?;
    tracing::debug!("Extracting CV text from '{}' ({} bytes)", filename, data.len());

    let processor = state.documents;
    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || {
        processor.extract_text(&name, content_type.as_deref(), &data)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in text extraction: {e}")))??;

    Ok(Json(TextExtractionResponse { text, filename }))
}
