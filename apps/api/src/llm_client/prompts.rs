// Shared prompt fragments. Each agent keeps its own templates alongside it;
// this file only holds the cross-cutting pieces.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every free-text generation prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the candidate CV and the job details. \
    Never invent employers, dates, degrees, certifications or metrics.";

/// Appended to every free-text generation prompt so the output can be shown as-is.
pub const PLAIN_MARKDOWN_INSTRUCTION: &str = "\
    Return the final document only, in Markdown. \
    Do NOT wrap it in code fences and do NOT add commentary before or after it.";

fn placeholder() -> &'static Regex {
    static COMPILED: OnceLock<Regex> = OnceLock::new();
    COMPILED.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern must compile"))
}

/// Substitutes every `{name}` in one pass. Values are inserted verbatim and
/// never rescanned, so braces inside job text or a CV survive untouched.
/// Names the lookup does not know are left as written.
pub fn fill_template<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<Cow<'a, str>>,
{
    placeholder()
        .replace_all(template, |caps: &Captures<'_>| match lookup(&caps[1]) {
            Some(value) => value.into_owned(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(key: &str) -> Option<Cow<'static, str>> {
        match key {
            "a" => Some(Cow::Borrowed("{b}")),
            "b" => Some(Cow::Owned("B".to_string())),
            _ => None,
        }
    }

    #[test]
    fn test_values_are_not_rescanned() {
        assert_eq!(fill_template("{a}/{b}", lookup), "{b}/B");
    }

    #[test]
    fn test_unknown_and_non_word_braces_are_kept() {
        assert_eq!(
            fill_template(r#"{"title": "x"} {missing} {b}"#, lookup),
            r#"{"title": "x"} {missing} B"#
        );
    }
}
