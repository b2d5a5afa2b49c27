//! Heuristic skill-match score: a deterministic fallback for the LLM score.
//!
//! For each job skill, a case-insensitive whole-word search runs over the CV.
//! score = ⌊found / total × 100⌋, capped at 100. No skills, or no hits, is 0.

use regex::RegexBuilder;

pub fn heuristic_score(job_skills: &[String], cv_text: &str) -> u8 {
    if job_skills.is_empty() {
        return 0;
    }

    let matched = job_skills
        .iter()
        .filter(|skill| skill_in_text(skill, cv_text))
        .count();

    if matched == 0 {
        return 0;
    }

    ((matched * 100) / job_skills.len()).min(100) as u8
}

fn skill_in_text(skill: &str, text: &str) -> bool {
    let skill = skill.trim();
    if skill.is_empty() {
        return false;
    }
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(skill)))
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}
