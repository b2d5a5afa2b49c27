//! Job Validator: three-layer rule engine over scraped job postings.
//!
//! Layers run in order (syntax → semantic → completeness) and never short-circuit:
//! every issue from every layer is collected before the job is rejected. A job that
//! passes comes back as a normalized copy; the input is never modified.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::job::ScrapedJob;

const VALID_URL_SCHEMES: &[&str] = &["http", "https"];
const DEFAULT_ALLOWED_BOARDS: &[&str] = &["linkedin", "gupy", "indeed"];

// ────────────────────────────────────────────────────────────────────────────
// Issue model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLayer {
    Syntax,
    Semantic,
    Completeness,
}

impl fmt::Display for ValidationLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationLayer::Syntax => "syntax",
            ValidationLayer::Semantic => "semantic",
            ValidationLayer::Completeness => "completeness",
        };
        f.write_str(name)
    }
}

/// A single rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub layer: ValidationLayer,
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationIssue {
    fn new(layer: ValidationLayer, field: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            layer,
            field: field.to_string(),
            message: message.into(),
            code: code.to_string(),
        }
    }

    /// Renders as `layer.field: message`, the form surfaced in API error details.
    pub fn detail(&self) -> String {
        format!("{}.{}: {}", self.layer, self.field, self.message)
    }
}

/// Raised when one or more rules fail. Always carries the full issue list.
#[derive(Debug, Clone, Error)]
#[error("Job validation failed ({})", summarize(.issues))]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        debug_assert!(!issues.is_empty(), "ValidationError requires at least one issue");
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}:{}:{}", i.layer, i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

/// Tunable thresholds. `Default` carries the production values.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub allowed_boards: Vec<String>,
    pub min_title_chars: usize,
    pub max_title_chars: usize,
    pub min_company_chars: usize,
    pub max_company_chars: usize,
    pub min_description_chars: usize,
    pub max_description_chars: usize,
    pub min_description_words: usize,
    pub min_skill_count: usize,
    pub max_skill_count: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            allowed_boards: DEFAULT_ALLOWED_BOARDS.iter().map(|b| b.to_string()).collect(),
            min_title_chars: 4,
            max_title_chars: 120,
            min_company_chars: 2,
            max_company_chars: 120,
            min_description_chars: 80,
            max_description_chars: 20_000,
            min_description_words: 15,
            min_skill_count: 1,
            max_skill_count: 25,
        }
    }
}

/// Stateless validator; safe to share across concurrent requests.
#[derive(Debug, Clone)]
pub struct JobValidator {
    rules: ValidationRules,
    allowed_boards: HashSet<String>,
}

impl Default for JobValidator {
    fn default() -> Self {
        Self::new(ValidationRules::default())
    }
}

impl JobValidator {
    pub fn new(rules: ValidationRules) -> Self {
        let allowed_boards = rules
            .allowed_boards
            .iter()
            .map(|b| b.trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        Self {
            rules,
            allowed_boards,
        }
    }

    /// Same rules without a minimum skill count. Generic postings never carry a
    /// skill list until the LLM supplies one, so their intake pass uses this.
    pub fn without_skill_minimum(&self) -> Self {
        Self::new(ValidationRules {
            min_skill_count: 0,
            ..self.rules.clone()
        })
    }

    /// Runs all three layers and returns a normalized copy of the job.
    pub fn validate(&self, job: &ScrapedJob) -> Result<ScrapedJob, ValidationError> {
        let mut issues = self.check_syntax(job);
        issues.extend(self.check_semantics(job));
        issues.extend(self.check_completeness(job));

        if !issues.is_empty() {
            return Err(ValidationError::new(issues));
        }

        Ok(normalize(job))
    }

    fn check_syntax(&self, job: &ScrapedJob) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !is_http_url(&job.url) {
            issues.push(ValidationIssue::new(
                ValidationLayer::Syntax,
                "url",
                "URL must include http(s) scheme and hostname",
                "invalid_url",
            ));
        }

        for (field, value) in [
            ("title", &job.title),
            ("company", &job.company),
            ("description", &job.description),
        ] {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    ValidationLayer::Syntax,
                    field,
                    format!("{} must be a non-empty string", capitalize_first(field)),
                    &format!("invalid_{field}"),
                ));
            }
        }

        if job.skills.iter().any(|s| s.trim().is_empty()) {
            issues.push(ValidationIssue::new(
                ValidationLayer::Syntax,
                "skills",
                "Each skill must be a non-empty string",
                "invalid_skill_entry",
            ));
        }

        issues
    }

    fn check_semantics(&self, job: &ScrapedJob) -> Vec<ValidationIssue> {
        let rules = &self.rules;
        let mut issues = Vec::new();

        if !self.allowed_boards.contains(&job.board.trim().to_lowercase()) {
            issues.push(ValidationIssue::new(
                ValidationLayer::Semantic,
                "board",
                format!("Board '{}' is not supported", job.board),
                "unsupported_board",
            ));
        }

        let title = job.title.trim();
        let title_len = title.chars().count();
        if title_len < rules.min_title_chars || title_len > rules.max_title_chars {
            issues.push(ValidationIssue::new(
                ValidationLayer::Semantic,
                "title",
                format!(
                    "Title must be between {} and {} characters",
                    rules.min_title_chars, rules.max_title_chars
                ),
                "title_length_out_of_bounds",
            ));
        } else if !title.chars().any(char::is_alphabetic) {
            issues.push(ValidationIssue::new(
                ValidationLayer::Semantic,
                "title",
                "Title must contain alphabetic characters",
                "title_requires_alpha",
            ));
        }

        let company_len = job.company.trim().chars().count();
        if company_len < rules.min_company_chars || company_len > rules.max_company_chars {
            issues.push(ValidationIssue::new(
                ValidationLayer::Semantic,
                "company",
                format!(
                    "Company must be between {} and {} characters",
                    rules.min_company_chars, rules.max_company_chars
                ),
                "company_length_out_of_bounds",
            ));
        }

        let description_len = job.description.trim().chars().count();
        if description_len < rules.min_description_chars {
            issues.push(ValidationIssue::new(
                ValidationLayer::Semantic,
                "description",
                format!(
                    "Description must contain at least {} characters",
                    rules.min_description_chars
                ),
                "description_too_short",
            ));
        } else if description_len > rules.max_description_chars {
            issues.push(ValidationIssue::new(
                ValidationLayer::Semantic,
                "description",
                format!("Description exceeds {} characters", rules.max_description_chars),
                "description_too_long",
            ));
        }

        issues
    }

    fn check_completeness(&self, job: &ScrapedJob) -> Vec<ValidationIssue> {
        let rules = &self.rules;
        let mut issues = Vec::new();

        let word_count = job.description.split_whitespace().count();
        if word_count < rules.min_description_words {
            issues.push(ValidationIssue::new(
                ValidationLayer::Completeness,
                "description",
                format!(
                    "Description must contain at least {} words",
                    rules.min_description_words
                ),
                "description_missing_detail",
            ));
        }

        let skill_count = job.skills.len();
        if skill_count < rules.min_skill_count {
            issues.push(ValidationIssue::new(
                ValidationLayer::Completeness,
                "skills",
                format!("At least {} skill(s) are required", rules.min_skill_count),
                "skills_missing",
            ));
        } else if skill_count > rules.max_skill_count {
            issues.push(ValidationIssue::new(
                ValidationLayer::Completeness,
                "skills",
                format!("Provide no more than {} skills", rules.max_skill_count),
                "skills_excessive",
            ));
        }

        issues
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

fn normalize(job: &ScrapedJob) -> ScrapedJob {
    ScrapedJob {
        url: job.url.trim().to_string(),
        board: job.board.trim().to_lowercase(),
        title: job.title.trim().to_string(),
        company: job.company.trim().to_string(),
        description: job.description.trim().to_string(),
        skills: normalize_skills(&job.skills),
        raw_html: job.raw_html.clone(),
    }
}

/// Trims, drops empties, dedupes case-insensitively (first occurrence wins) and
/// uppercases the first letter of all-lowercase entries. Mixed-case entries such
/// as `iOS` are kept verbatim.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
            continue;
        }
        if trimmed.chars().any(char::is_uppercase) {
            result.push(trimmed.to_string());
        } else {
            result.push(capitalize_first(trimmed));
        }
    }

    result
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_http_url(raw: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(url) => {
            VALID_URL_SCHEMES.contains(&url.scheme())
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
