use serde::{Deserialize, Serialize};

/// One job posting as produced by a scraper.
///
/// Treated as a value: validation and extraction return new copies rather
/// than mutating the record they were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedJob {
    pub url: String,
    pub board: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub skills: Vec<String>,
    /// Original page source, kept for LLM context only.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub raw_html: String,
}
