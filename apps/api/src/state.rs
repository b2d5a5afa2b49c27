use std::sync::Arc;

use crate::documents::DocumentProcessor;
use crate::generation::generator::GenerationAgent;
use crate::jobs::extraction::ExtractionAgent;
use crate::jobs::scraper::JobSource;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every service is stateless across requests, so one instance serves them all.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable job source. Default: WebScraper; tests inject scripted fakes.
    pub scraper: Arc<dyn JobSource>,
    pub extraction: Arc<ExtractionAgent>,
    pub generation: Arc<GenerationAgent>,
    pub documents: DocumentProcessor,
}
