//! Extraction Agent: normalizes a scraped posting through the LLM.
//!
//! Flow: validate input → build prompt → one LLM call → decode payload →
//!       merge with the validated original → validate again.
//!
//! Generic-board postings enter without skills, so their intake pass does not
//! require any; the post-merge pass is always strict.
//!
//! The LLM is called exactly once per run. Any failure, including a reply that
//! does not decode, surfaces as `ExtractionAgentError` with the cause attached.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::jobs::prompts::{
    EXTRACTION_FORMAT_INSTRUCTIONS, EXTRACTION_PROMPT_TEMPLATE, EXTRACTION_SYSTEM,
};
use crate::jobs::scraper::Board;
use crate::jobs::validation::{JobValidator, ValidationError, ValidationIssue};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{complete_json, CompletionModel, CompletionRequest, LlmError};
use crate::models::job::ScrapedJob;

const DEFAULT_HIGHLIGHT_COUNT: usize = 3;
const EXTRACTION_TEMPERATURE: f32 = 0.2;
const HTML_PREVIEW_LIMIT: usize = 2000;
const HTML_PREVIEW_PLACEHOLDER: &str = " …";

#[derive(Debug, Error)]
pub enum ExtractionAgentError {
    #[error("LLM extraction failed: {0}")]
    Llm(#[source] LlmError),

    #[error("Validation failed for scraped job")]
    Validation(#[source] ValidationError),
}

impl ExtractionAgentError {
    /// Issue list when the failure came from the validator.
    pub fn validation_issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            ExtractionAgentError::Validation(e) => Some(e.issues()),
            ExtractionAgentError::Llm(_) => None,
        }
    }
}

/// Structured payload the model is asked to return. Missing keys decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredJobPayload {
    pub title: String,
    pub company: String,
    pub description: String,
    pub skills: Vec<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub job: ScrapedJob,
    pub highlights: Vec<String>,
}

/// Stateless apart from its collaborators; one instance serves all requests.
#[derive(Clone)]
pub struct ExtractionAgent {
    model: Arc<dyn CompletionModel>,
    validator: JobValidator,
    generic_intake: JobValidator,
    highlight_count: usize,
}

impl ExtractionAgent {
    pub fn new(model: Arc<dyn CompletionModel>, validator: JobValidator) -> Self {
        Self {
            model,
            generic_intake: validator.without_skill_minimum(),
            validator,
            highlight_count: DEFAULT_HIGHLIGHT_COUNT,
        }
    }

    pub fn with_highlight_count(mut self, highlight_count: usize) -> Self {
        self.highlight_count = highlight_count;
        self
    }

    pub async fn run(&self, scraped_job: &ScrapedJob) -> Result<ExtractionResult, ExtractionAgentError> {
        debug!("Extraction started: board={} url={}", scraped_job.board, scraped_job.url);

        let intake = if scraped_job.board.trim().eq_ignore_ascii_case(Board::Generic.as_str()) {
            &self.generic_intake
        } else {
            &self.validator
        };
        let validated = intake
            .validate(scraped_job)
            .map_err(ExtractionAgentError::Validation)?;

        let request = self.build_request(&validated);
        let structured: StructuredJobPayload = complete_json(self.model.as_ref(), &request)
            .await
            .map_err(ExtractionAgentError::Llm)?;

        let merged = merge_payload(&validated, &structured);
        let job = self
            .validator
            .validate(&merged)
            .map_err(ExtractionAgentError::Validation)?;

        debug!("Extraction succeeded: board={} url={}", job.board, job.url);
        Ok(ExtractionResult {
            job,
            highlights: structured.highlights,
        })
    }

    fn build_request(&self, job: &ScrapedJob) -> CompletionRequest {
        // raw_html is skip_serializing, so the preview below is the only HTML sent
        let job_data = serde_json::to_string_pretty(job).unwrap_or_default();

        let preview = html_preview(&job.raw_html, HTML_PREVIEW_LIMIT);
        let lookup = |key: &str| {
            let value: Cow<'_, str> = match key {
                "job_data" => Cow::Borrowed(job_data.as_str()),
                "job_html_preview" => Cow::Borrowed(preview.as_str()),
                "format_instructions" => Cow::Borrowed(EXTRACTION_FORMAT_INSTRUCTIONS),
                "highlight_count" => Cow::Owned(self.highlight_count.to_string()),
                "json_only" => Cow::Borrowed(JSON_ONLY_INSTRUCTION),
                _ => return None,
            };
            Some(value)
        };

        CompletionRequest {
            system: fill_template(EXTRACTION_SYSTEM, &lookup),
            prompt: fill_template(EXTRACTION_PROMPT_TEMPLATE, &lookup),
            temperature: EXTRACTION_TEMPERATURE,
        }
    }
}

/// Field-level merge: model values win when non-empty, originals fill the gaps.
pub fn merge_payload(original: &ScrapedJob, structured: &StructuredJobPayload) -> ScrapedJob {
    let pick = |llm: &str, fallback: &str| {
        if llm.is_empty() {
            fallback.to_string()
        } else {
            llm.to_string()
        }
    };

    let skills = if structured.skills.is_empty() {
        &original.skills
    } else {
        &structured.skills
    };

    ScrapedJob {
        url: original.url.clone(),
        board: original.board.clone(),
        title: pick(&structured.title, &original.title),
        company: pick(&structured.company, &original.company),
        description: pick(&structured.description, &original.description),
        skills: dedupe_skills(skills),
        raw_html: original.raw_html.clone(),
    }
}

/// Trims, drops empties and removes case-insensitive repeats, keeping first occurrences.
fn dedupe_skills(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && seen.insert(v.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Collapses HTML to a single line and shortens it on a word boundary,
/// appending a placeholder when anything was cut.
pub fn html_preview(html: &str, limit: usize) -> String {
    let words: Vec<&str> = html.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= limit {
        return collapsed;
    }

    let budget = limit.saturating_sub(HTML_PREVIEW_PLACEHOLDER.chars().count());
    let mut preview = String::new();
    let mut used = 0;
    for word in words {
        let cost = word.chars().count() + usize::from(used > 0);
        if used + cost > budget {
            break;
        }
        if used > 0 {
            preview.push(' ');
        }
        preview.push_str(word);
        used += cost;
    }

    if preview.is_empty() {
        HTML_PREVIEW_PLACEHOLDER.trim_start().to_string()
    } else {
        preview + HTML_PREVIEW_PLACEHOLDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::jobs::validation::{ValidationLayer, ValidationRules};

    /// Replays one canned reply and records every request it receives.
    struct ScriptedModel {
        reply: Result<String, fn() -> LlmError>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(vec![]),
            })
        }

        fn failing(err: fn() -> LlmError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                requests: Mutex::new(vec![]),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionModel for ScriptedModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn scraped_job() -> ScrapedJob {
        ScrapedJob {
            url: "https://www.linkedin.com/jobs/view/123".to_string(),
            board: "LinkedIn".to_string(),
            title: " Senior Backend Engineer ".to_string(),
            company: "Tech Corp".to_string(),
            description: "Build reliable APIs and scale distributed systems across regions. \
                You will own services end to end, mentor engineers and improve observability."
                .to_string(),
            skills: vec!["python".to_string(), "FastAPI".to_string(), "AWS".to_string()],
            raw_html: "<html>\n  <body>  <h1>Senior Backend Engineer</h1> </body>\n</html>"
                .to_string(),
        }
    }

    fn agent(model: Arc<ScriptedModel>) -> ExtractionAgent {
        ExtractionAgent::new(model, JobValidator::default())
    }

    #[tokio::test]
    async fn test_llm_values_override_original_fields() {
        let model = ScriptedModel::replying(
            r#"{
                "title": "Senior Backend Engineer (Python)",
                "company": "Tech Corp Ltd",
                "description": "",
                "skills": ["Python", "python", " Kubernetes ", ""],
                "highlights": ["Remote friendly", "Equity"]
            }"#,
        );
        let result = agent(model.clone()).run(&scraped_job()).await.unwrap();

        assert_eq!(result.job.title, "Senior Backend Engineer (Python)");
        assert_eq!(result.job.company, "Tech Corp Ltd");
        assert!(result.job.description.starts_with("Build reliable APIs"));
        assert_eq!(result.job.skills, vec!["Python", "Kubernetes"]);
        assert_eq!(result.job.board, "linkedin");
        assert_eq!(result.highlights, vec!["Remote friendly", "Equity"]);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_payload_returns_validated_original() {
        let model = ScriptedModel::replying(
            r#"{"title": "", "company": "", "description": "", "skills": [], "highlights": []}"#,
        );
        let original = JobValidator::default().validate(&scraped_job()).unwrap();

        let result = agent(model).run(&scraped_job()).await.unwrap();
        assert_eq!(result.job, original);
        assert!(result.highlights.is_empty());
    }

    #[tokio::test]
    async fn test_missing_payload_keys_fall_back_to_original() {
        let model = ScriptedModel::replying("```json\n{\"highlights\": [\"Hybrid\"]}\n```");
        let original = JobValidator::default().validate(&scraped_job()).unwrap();

        let result = agent(model).run(&scraped_job()).await.unwrap();
        assert_eq!(result.job, original);
        assert_eq!(result.highlights, vec!["Hybrid"]);
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_llm_call() {
        let model = ScriptedModel::replying("{}");
        let mut job = scraped_job();
        job.company = String::new();
        job.skills.clear();

        let err = agent(model.clone()).run(&job).await.unwrap_err();
        let issues = err.validation_issues().expect("validation cause");
        assert!(issues.iter().any(|i| i.field == "company"));
        assert!(issues.iter().any(|i| i.field == "skills"));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_merged_job_is_revalidated() {
        let model = ScriptedModel::replying(r#"{"title": "1234", "highlights": []}"#);

        let err = agent(model).run(&scraped_job()).await.unwrap_err();
        let issues = err.validation_issues().expect("validation cause");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].layer, ValidationLayer::Semantic);
        assert_eq!(issues[0].code, "title_requires_alpha");
    }

    #[tokio::test]
    async fn test_llm_failure_is_wrapped() {
        let model = ScriptedModel::failing(|| LlmError::Api {
            status: 529,
            message: "overloaded".to_string(),
        });

        let err = agent(model.clone()).run(&scraped_job()).await.unwrap_err();
        assert!(matches!(err, ExtractionAgentError::Llm(LlmError::Api { status: 529, .. })));
        assert!(err.validation_issues().is_none());
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_reply_is_llm_error() {
        let model = ScriptedModel::replying("I could not find a job on this page.");
        let err = agent(model).run(&scraped_job()).await.unwrap_err();
        assert!(matches!(err, ExtractionAgentError::Llm(LlmError::Parse(_))));
    }

    #[tokio::test]
    async fn test_prompt_carries_job_preview_and_highlight_count() {
        let model = ScriptedModel::replying("{}");
        let agent = agent(model.clone()).with_highlight_count(5);
        agent.run(&scraped_job()).await.unwrap();

        let requests = model.requests.lock().unwrap();
        let request = &requests[0];
        assert!(request.prompt.contains("\"title\": \"Senior Backend Engineer\""));
        assert!(request.prompt.contains("<html> <body> <h1>Senior Backend Engineer</h1> </body> </html>"));
        assert!(request.prompt.contains("up to 5 concise highlights"));
        assert!(!request.prompt.contains("raw_html"));
        assert!(request.system.contains("valid JSON only"));
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    }

    fn generic_job() -> ScrapedJob {
        ScrapedJob {
            url: "https://careers.example.com/42".to_string(),
            board: "generic".to_string(),
            title: "Platform Engineer".to_string(),
            skills: vec![],
            ..scraped_job()
        }
    }

    fn generic_agent(model: Arc<ScriptedModel>) -> ExtractionAgent {
        ExtractionAgent::new(
            model,
            JobValidator::new(ValidationRules {
                allowed_boards: vec!["linkedin".to_string(), "generic".to_string()],
                ..ValidationRules::default()
            }),
        )
    }

    #[tokio::test]
    async fn test_generic_posting_takes_skills_from_llm() {
        let model = ScriptedModel::replying(r#"{"skills": ["kubernetes", "Go"]}"#);

        let result = generic_agent(model.clone()).run(&generic_job()).await.unwrap();

        assert_eq!(result.job.skills, vec!["Kubernetes", "Go"]);
        assert_eq!(result.job.board, "generic");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_generic_posting_still_needs_skills_after_merge() {
        let model = ScriptedModel::replying(r#"{"skills": []}"#);

        let err = generic_agent(model.clone()).run(&generic_job()).await.unwrap_err();

        let issues = err.validation_issues().expect("validation cause");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "skills_missing");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_listed_board_without_skills_fails_before_llm_call() {
        let model = ScriptedModel::replying(r#"{"skills": ["Go"]}"#);
        let mut job = scraped_job();
        job.skills.clear();

        let err = generic_agent(model.clone()).run(&job).await.unwrap_err();

        assert!(err.validation_issues().is_some());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_placeholders_inside_scraped_text_stay_literal() {
        let model = ScriptedModel::replying("{}");
        let mut job = scraped_job();
        job.description = format!("{} Templates use {{highlight_count}} markers.", job.description);

        agent(model.clone()).run(&job).await.unwrap();

        let requests = model.requests.lock().unwrap();
        let prompt = &requests[0].prompt;
        assert!(prompt.contains("Templates use {highlight_count} markers."));
        assert!(prompt.contains("up to 3 concise highlights"));
    }

    #[test]
    fn test_html_preview_short_input_is_collapsed_only() {
        assert_eq!(html_preview("<p>\n  hi\tthere </p>", 2000), "<p> hi there </p>");
        assert_eq!(html_preview("", 2000), "");
    }

    #[test]
    fn test_html_preview_truncates_on_word_boundary() {
        let html = "alpha beta gamma delta";
        let preview = html_preview(html, 14);
        assert_eq!(preview, "alpha beta …");
        assert!(preview.chars().count() <= 14);
    }

    #[test]
    fn test_html_preview_respects_limit_on_large_pages() {
        let html = "<div>word</div> ".repeat(1_000);
        let preview = html_preview(&html, HTML_PREVIEW_LIMIT);
        assert!(preview.chars().count() <= HTML_PREVIEW_LIMIT);
        assert!(preview.ends_with(" …"));
    }

    #[test]
    fn test_merge_prefers_llm_skills_even_if_different() {
        let original = scraped_job();
        let payload = StructuredJobPayload {
            skills: vec!["Go".to_string()],
            ..StructuredJobPayload::default()
        };
        let merged = merge_payload(&original, &payload);
        assert_eq!(merged.skills, vec!["Go"]);
        assert_eq!(merged.title, original.title);
    }
}
