mod config;
mod documents;
mod errors;
mod generation;
mod jobs;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::documents::DocumentProcessor;
use crate::generation::generator::GenerationAgent;
use crate::jobs::extraction::ExtractionAgent;
use crate::jobs::scraper::WebScraper;
use crate::jobs::validation::{JobValidator, ValidationRules};
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (shared by both agents)
    let llm = Arc::new(
        LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout)
            .context("Failed to build LLM HTTP client")?,
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let validator = JobValidator::new(ValidationRules {
        allowed_boards: config.allowed_boards.clone(),
        ..ValidationRules::default()
    });
    info!("Allowed job boards: {}", config.allowed_boards.join(", "));

    let scraper = WebScraper::new(config.scrape_timeout).context("Failed to build scraper HTTP client")?;

    // Build app state
    let state = AppState {
        scraper: Arc::new(scraper),
        extraction: Arc::new(ExtractionAgent::new(llm.clone(), validator)),
        generation: Arc::new(
            GenerationAgent::new(llm, RetryPolicy::generation())
                .with_deadline(config.generation_timeout),
        ),
        documents: DocumentProcessor,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS restricted to the configured frontend origins.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
