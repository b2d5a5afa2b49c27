pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::documents::handlers::handle_extract_cv_text;
use crate::generation::handlers::handle_generate_materials;
use crate::jobs::handlers::handle_extract_job_details;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/extract-job-details", post(handle_extract_job_details))
        .route("/generate-materials", post(handle_generate_materials))
        .route("/extract-cv-text", post(handle_extract_cv_text))
        .with_state(state)
}
