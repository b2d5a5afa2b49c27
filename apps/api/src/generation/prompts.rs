// All LLM prompt templates for the Generation module.
// Every template shares one placeholder set, filled by `generator::render`:
// {job_title} {job_company} {job_description} {job_skills} {candidate_name} {candidate_cv}
// {language} {tone} {variance_instruction} {score_heading}
// plus the cross-cutting fragments {grounding_instruction} {markdown_instruction}.

/// CV rewrite: system prompt.
pub const CV_SYSTEM: &str = "You are an expert CV writer and career strategist. \
    Rewrite the candidate's CV so it aligns with one specific job description. \
    Focus on achievements, relevant skills and keywords from the job description. \
    Write in {language} with a {tone} tone.";

pub const CV_PROMPT_TEMPLATE: &str = r#"JOB DETAILS:
Title: {job_title}
Company: {job_company}
Description: {job_description}
Required Skills: {job_skills}

CANDIDATE NAME: {candidate_name}

CANDIDATE CV:
{candidate_cv}

{grounding_instruction}

INFERENCE POLICY:
{variance_instruction}

MANDATORY STRUCTURE (Markdown, section titles translated to {language}):
# <Candidate name>
<one-line headline, no label>
<short professional summary paragraph, no label>
## Experience
## Education
## Skills

Do NOT use auxiliary labels such as "Headline:", "Summary:" or "Profile:".
{markdown_instruction}"#;

/// Cover letter: system prompt.
pub const COVER_LETTER_SYSTEM: &str = "You are an expert career coach who writes compelling, \
    personalized cover letters. Highlight why the candidate is a great fit based on the CV \
    and the job description. Write in {language} with a {tone} tone.";

pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"JOB DETAILS:
Title: {job_title}
Company: {job_company}
Description: {job_description}

CANDIDATE CV:
{candidate_cv}

{grounding_instruction}

Task: Write a cover letter of at most four paragraphs addressed to the hiring team at {job_company}.
{markdown_instruction}"#;

/// Networking advice: system prompt.
pub const NETWORKING_SYSTEM: &str = "You are a networking expert who gives actionable advice \
    for a specific job application. Write in {language} with a {tone} tone.";

pub const NETWORKING_PROMPT_TEMPLATE: &str = r#"JOB DETAILS:
Title: {job_title}
Company: {job_company}
Description: {job_description}

CANDIDATE CV:
{candidate_cv}

Task: Provide
1. Two LinkedIn connection request templates (under 300 characters each) for recruiters or hiring managers at {job_company}.
2. Two smart questions to ask during an interview that demonstrate deep understanding of the role.
{markdown_instruction}"#;

/// Compatibility insights: system prompt.
pub const INSIGHTS_SYSTEM: &str = "You are a hiring manager analysing how well a candidate \
    matches a job. Write in {language} with a {tone} tone. Never answer with JSON.";

pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"JOB DETAILS:
Title: {job_title}
Description: {job_description}
Required Skills: {job_skills}

CANDIDATE CV:
{candidate_cv}

Task: Analyse the match and answer in Markdown with EXACTLY this layout
(headings translated to {language}, keep the score line verbatim):

## {score_heading}: NN/100

### <Strengths>
- three key strengths to emphasize in the application

### <Gap>
- one potential gap or weakness to address proactively

NN is an integer from 0 to 100 based on skills and experience match.
Do NOT output JSON, code fences, or keys such as "score" or "strengths"."#;

/// Inference liberty for the CV rewrite, indexed by variance level 1–5.
pub const VARIANCE_INSTRUCTIONS: [&str; 5] = [
    "Stay strictly literal: rephrase only what the CV states, add nothing.",
    "Light reframing: reorder and reword experience to match the role, without new claims.",
    "Balanced: emphasize transferable experience and name adjacent skills the CV clearly demonstrates.",
    "Assertive: surface implied competencies that are strongly supported by the CV's projects and roles.",
    "Maximum liberty: infer plausible competencies from the CV's context, while never fabricating employers, dates or credentials.",
];
