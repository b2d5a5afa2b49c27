//! Axum route handler for the job extraction API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use url::Url;

use crate::errors::AppError;
use crate::jobs::scraper::ScrapeError;
use crate::models::job::ScrapedJob;
use crate::state::AppState;

const JOB_ID_LEN: usize = 12;

#[derive(Debug, Deserialize)]
pub struct ExtractJobDetailsRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub url: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobResponse {
    fn from_job(job: ScrapedJob) -> Self {
        Self {
            id: job_identifier(&job.url),
            url: job.url,
            title: job.title,
            company: job.company,
            description: job.description,
            skills: job.skills,
            created_at: Utc::now(),
        }
    }
}

/// Stable 12-hex-char fingerprint of a job URL (truncated SHA-1).
pub fn job_identifier(url: &str) -> String {
    let mut digest = format!("{:x}", Sha1::digest(url.as_bytes()));
    digest.truncate(JOB_ID_LEN);
    digest
}

/// POST /extract-job-details
///
/// Scrape → validate → LLM extraction → validate. The response id is derived
/// from the final job URL, so repeated calls for one posting agree.
pub async fn handle_extract_job_details(
    State(state): State<AppState>,
    payload: Result<Json<ExtractJobDetailsRequest>, JsonRejection>,
) -> Result<Json<JobResponse>, AppError> {
    let Json(request) = payload?;
    let url = request.url.trim();
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => return Err(ScrapeError::UnsupportedBoard(url.to_string()).into()),
    }

    let scraped = state.scraper.fetch_job(url).await?;
    let result = state.extraction.run(&scraped).await?;
    tracing::debug!(
        "Extracted '{}' at {} ({} highlights)",
        result.job.title,
        result.job.company,
        result.highlights.len()
    );

    Ok(Json(JobResponse::from_job(result.job)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_12_lowercase_hex() {
        let id = job_identifier("https://www.linkedin.com/jobs/view/123");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_identifier_is_stable_and_url_specific() {
        let a = job_identifier("https://www.linkedin.com/jobs/view/123");
        assert_eq!(a, job_identifier("https://www.linkedin.com/jobs/view/123"));
        assert_ne!(a, job_identifier("https://www.linkedin.com/jobs/view/124"));
    }

    #[test]
    fn test_identifier_matches_sha1_prefix() {
        // sha1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        assert_eq!(job_identifier("abc"), "a9993e364706");
    }
}
