// Job intake: scrape a posting, validate it, refine it with the LLM.

pub mod extraction;
pub mod handlers;
pub mod prompts;
pub mod scraper;
pub mod validation;
