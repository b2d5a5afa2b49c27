//! Generation Agent: produces the application bundle for one job + CV.
//!
//! Flow: resolve language → render four prompts → run CV, cover letter,
//!       networking and insights concurrently (each under its own retry policy)
//!       → decode the score from insights → fall back to the heuristic score.
//!
//! There is no partial bundle: if any task exhausts its retries, or the whole
//! batch overruns the deadline, `generate_all` fails.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::generation::insights::decode_score;
use crate::generation::language::{language_name, resolve_language, score_heading, AUTO};
use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, CV_PROMPT_TEMPLATE, CV_SYSTEM,
    INSIGHTS_PROMPT_TEMPLATE, INSIGHTS_SYSTEM, NETWORKING_PROMPT_TEMPLATE, NETWORKING_SYSTEM,
    VARIANCE_INSTRUCTIONS,
};
use crate::generation::scoring::heuristic_score;
use crate::llm_client::prompts::{
    fill_template, GROUNDING_INSTRUCTION, PLAIN_MARKDOWN_INSTRUCTION,
};
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{CompletionModel, CompletionRequest, LlmError};

const GENERATION_TEMPERATURE: f32 = 0.4;
const DEFAULT_TONE: &str = "professional";
const DEFAULT_VARIANCE: u8 = 3;
const UNNAMED_CANDIDATE: &str = "as written in the CV";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Job fields generation needs. Mirrors the public `job` request object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSummary {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Caller-tunable knobs. `variance` is clamped into 1..=5.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub language: String,
    pub tone: String,
    pub variance: u8,
    /// Heading for the CV. Blank or absent leaves it to the CV text.
    pub candidate_name: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            language: AUTO.to_string(),
            tone: DEFAULT_TONE.to_string(),
            variance: DEFAULT_VARIANCE,
            candidate_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedBundle {
    pub cv: String,
    pub cover_letter: String,
    pub networking: String,
    pub insights: String,
    /// 0 – 100
    pub match_score: u8,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationTask {
    Cv,
    CoverLetter,
    Networking,
    Insights,
}

impl GenerationTask {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationTask::Cv => "cv",
            GenerationTask::CoverLetter => "cover_letter",
            GenerationTask::Networking => "networking",
            GenerationTask::Insights => "insights",
        }
    }

    fn templates(&self) -> (&'static str, &'static str) {
        match self {
            GenerationTask::Cv => (CV_SYSTEM, CV_PROMPT_TEMPLATE),
            GenerationTask::CoverLetter => (COVER_LETTER_SYSTEM, COVER_LETTER_PROMPT_TEMPLATE),
            GenerationTask::Networking => (NETWORKING_SYSTEM, NETWORKING_PROMPT_TEMPLATE),
            GenerationTask::Insights => (INSIGHTS_SYSTEM, INSIGHTS_PROMPT_TEMPLATE),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{} generation failed: {source}", .task.label())]
    Task {
        task: GenerationTask,
        #[source]
        source: LlmError,
    },

    #[error("generation exceeded the {}s deadline", .0.as_secs())]
    Timeout(Duration),
}

/// Input bundle shared by all four tasks.
struct PromptInputs<'a> {
    job: &'a JobSummary,
    cv_text: &'a str,
    language: String,
    tone: &'a str,
    variance: u8,
    candidate_name: &'a str,
}

// ────────────────────────────────────────────────────────────────────────────
// Agent
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GenerationAgent {
    model: Arc<dyn CompletionModel>,
    retry: RetryPolicy,
    deadline: Option<Duration>,
}

impl GenerationAgent {
    pub fn new(model: Arc<dyn CompletionModel>, retry: RetryPolicy) -> Self {
        Self {
            model,
            retry,
            deadline: None,
        }
    }

    /// Hard ceiling for one `generate_all` call, retries included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn generate_all(
        &self,
        job: &JobSummary,
        cv_text: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedBundle, GenerationError> {
        info!("Generation started for job '{}'", job.title);

        let inputs = PromptInputs {
            job,
            cv_text,
            language: resolve_language(&options.language, &job.description),
            tone: match options.tone.trim() {
                "" => DEFAULT_TONE,
                tone => tone,
            },
            variance: options.variance.clamp(1, 5),
            candidate_name: options
                .candidate_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(UNNAMED_CANDIDATE),
        };
        debug!(
            "Generation inputs: language={} tone={} variance={}",
            inputs.language, inputs.tone, inputs.variance
        );

        let batch = async {
            tokio::try_join!(
                self.run_task(GenerationTask::Cv, &inputs),
                self.run_task(GenerationTask::CoverLetter, &inputs),
                self.run_task(GenerationTask::Networking, &inputs),
                self.run_task(GenerationTask::Insights, &inputs),
            )
        };

        let (cv, cover_letter, networking, insights) = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, batch)
                .await
                .map_err(|_| GenerationError::Timeout(deadline))??,
            None => batch.await?,
        };

        let heuristic = heuristic_score(&job.skills, cv_text);
        let match_score = match decode_score(&insights) {
            Ok(llm_score) => {
                debug!("Match scores: llm={} heuristic={}", llm_score, heuristic);
                llm_score
            }
            Err(_) => {
                debug!(
                    "No score found in insights; using heuristic score {}",
                    heuristic
                );
                heuristic
            }
        };

        Ok(GeneratedBundle {
            cv,
            cover_letter,
            networking,
            insights,
            match_score,
            generated_at: Utc::now(),
        })
    }

    async fn run_task(
        &self,
        task: GenerationTask,
        inputs: &PromptInputs<'_>,
    ) -> Result<String, GenerationError> {
        let request = render(task, inputs);
        self.retry
            .run(task.label(), || self.model.complete(&request))
            .await
            .map(|text| unwrap_code_fence(&text))
            .map_err(|source| GenerationError::Task { task, source })
    }
}

/// Fills a task's templates from the shared input bundle.
fn render(task: GenerationTask, inputs: &PromptInputs<'_>) -> CompletionRequest {
    let (system, template) = task.templates();
    let language = language_name(&inputs.language);
    let variance_instruction = VARIANCE_INSTRUCTIONS[usize::from(inputs.variance - 1)];

    let lookup = |key: &str| {
        let value: &str = match key {
            "grounding_instruction" => GROUNDING_INSTRUCTION,
            "markdown_instruction" => PLAIN_MARKDOWN_INSTRUCTION,
            "variance_instruction" => variance_instruction,
            "score_heading" => score_heading(&inputs.language),
            "language" => &language,
            "tone" => inputs.tone,
            "job_title" => &inputs.job.title,
            "job_company" => &inputs.job.company,
            "job_skills" => return Some(Cow::Owned(inputs.job.skills.join(", "))),
            "job_description" => &inputs.job.description,
            "candidate_name" => inputs.candidate_name,
            "candidate_cv" => inputs.cv_text,
            _ => return None,
        };
        Some(Cow::Borrowed(value))
    };
    let fill = |text: &str| fill_template(text, &lookup);

    CompletionRequest {
        system: fill(system),
        prompt: fill(template),
        temperature: GENERATION_TEMPERATURE,
    }
}

/// Removes a single surrounding ``` fence (with optional info string) from model output.
fn unwrap_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
