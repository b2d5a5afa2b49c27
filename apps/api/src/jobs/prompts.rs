// LLM prompt constants for job extraction.

/// System prompt for normalizing a scraped posting. Replace `{json_only}`.
pub const EXTRACTION_SYSTEM: &str = "You are an expert technical recruiter. \
    Transform scraped job postings into a structured, clean summary with consistent casing \
    and deduplicated skills. Only use the provided content; never invent employers or titles. \
    {json_only}";

/// Extraction prompt template.
/// Replace: {job_data}, {job_html_preview}, {format_instructions}, {highlight_count}
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Job data:
{job_data}

HTML snippet:
{job_html_preview}

You must respond with JSON using the following schema instructions:
{format_instructions}

Generate up to {highlight_count} concise highlights describing the opportunity."#;

/// Schema description of `StructuredJobPayload`, embedded in the prompt.
pub const EXTRACTION_FORMAT_INSTRUCTIONS: &str = r#"Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Canonical job title",
  "company": "Canonical employer name",
  "description": "Concise but detailed responsibilities and requirements",
  "skills": ["Sorted, deduplicated skills"],
  "highlights": ["Key bullet points extracted from the posting"]
}
All keys are required. Use an empty string or empty list when the posting does not say."#;
