use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";
const DEFAULT_ALLOWED_BOARDS: &str = "linkedin,gupy,indeed,generic";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a numeric one is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub cors_origins: Vec<String>,
    pub allowed_boards: Vec<String>,
    pub scrape_timeout: Duration,
    /// Hard deadline for one generation batch, retries included.
    pub generation_timeout: Duration,
    /// Per HTTP call to the model.
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let anthropic_api_key = lookup("ANTHROPIC_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")?;

        let mut cors_origins = split_list(lookup("CORS_ORIGINS").as_deref());
        if cors_origins.is_empty() {
            cors_origins = split_list(Some(DEFAULT_CORS_ORIGINS));
        }

        let mut allowed_boards = split_list(lookup("ALLOWED_BOARDS").as_deref());
        if allowed_boards.is_empty() {
            allowed_boards = split_list(Some(DEFAULT_ALLOWED_BOARDS));
        }

        Ok(Config {
            anthropic_api_key,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            cors_origins,
            allowed_boards,
            scrape_timeout: Duration::from_secs(parse_or(&lookup, "SCRAPE_TIMEOUT_SECS", 15)?),
            generation_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GENERATION_TIMEOUT_SECS",
                90,
            )?),
            llm_timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 60)?),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
