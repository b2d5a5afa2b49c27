//! Axum route handler for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::generator::{GenerationOptions, JobSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub summary: JobSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[serde(default)]
    pub name: Option<String>,
    pub cv_text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub job: JobInput,
    pub profile: ProfileInput,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    /// Any integer is accepted and clamped into 1..=5.
    #[serde(default)]
    pub variance: Option<i64>,
}

impl GenerateRequest {
    fn options(&self) -> GenerationOptions {
        let defaults = GenerationOptions::default();
        GenerationOptions {
            language: self.language.clone().unwrap_or(defaults.language),
            tone: self.tone.clone().unwrap_or(defaults.tone),
            variance: self
                .variance
                .map(|v| v.clamp(1, 5) as u8)
                .unwrap_or(defaults.variance),
            candidate_name: self.profile.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAssetsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub cv: String,
    pub cover_letter: String,
    pub networking: String,
    pub insights: String,
    pub match_score: u8,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-materials
///
/// Runs the four generation tasks for one job and CV. Any task failure fails
/// the request; no partial bundle is returned.
pub async fn handle_generate_materials(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GeneratedAssetsResponse>, AppError> {
    let Json(request) = payload?;
    if request.profile.cv_text.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "profile.cvText cannot be empty".to_string(),
        ));
    }

    let options = request.options();
    let bundle = state
        .generation
        .generate_all(&request.job.summary, &request.profile.cv_text, &options)
        .await?;

    Ok(Json(GeneratedAssetsResponse {
        job_id: request.job.id,
        cv: bundle.cv,
        cover_letter: bundle.cover_letter,
        networking: bundle.networking,
        insights: bundle.insights,
        match_score: bundle.match_score,
        generated_at: bundle.generated_at,
    }))
}
