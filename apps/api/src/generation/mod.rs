// Application material generation: CV, cover letter, networking advice and
// compatibility insights, plus the match score derived from them.
// All LLM calls go through llm_client::CompletionModel.

pub mod generator;
pub mod handlers;
pub mod insights;
pub mod language;
pub mod prompts;
pub mod scoring;
