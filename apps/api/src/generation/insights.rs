//! Score decoder for the free-form insights document.
//!
//! The insights task returns Markdown, not JSON. The compatibility score is
//! pulled out by an ordered list of patterns: language-specific phrasings first,
//! then any Markdown heading of the form `## <label>: NN/100`. The first pattern
//! that matches wins, regardless of where in the text its match sits.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

const SCORE_PATTERNS: &[&str] = &[
    // pt
    r"(?i)compatibilidade[\s*:]*(\d+)\s*/\s*100",
    // es
    r"(?i)compatibilidad[\s*:]*(\d+)\s*/\s*100",
    // fr
    r"(?i)compatibilit[ée][\s*:]*(\d+)\s*/\s*100",
    // en
    r"(?i)compatibility(?:\s+score)?[\s*:]*(\d+)\s*/\s*100",
    r"(?i)match\s+score[\s*:]*(\d+)\s*/\s*100",
    // generic heading
    r"(?m)^\s*#{1,6}\s*[^\n:]{1,60}:\s*\**\s*(\d+)\s*/\s*100",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreDecodeError {
    #[error("no compatibility score found in insights text")]
    NotFound,
}

fn patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        SCORE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("score pattern must compile"))
            .collect()
    })
}

/// Returns the first pattern match, clamped to 0..=100. Callers treat
/// `NotFound` as a score of 0 and substitute the heuristic.
pub fn decode_score(text: &str) -> Result<u8, ScoreDecodeError> {
    patterns()
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|digits| {
            digits
                .as_str()
                .parse::<u64>()
                .map_or(100, |n| n.min(100) as u8)
        })
        .ok_or(ScoreDecodeError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portuguese_heading() {
        let text = "\n## Compatibilidade: 85/100\n\n### Pontos Fortes\n- Python\n";
        assert_eq!(decode_score(text), Ok(85));
    }

    #[test]
    fn test_english_heading() {
        let text = "## Compatibility: 92/100\n\n### Strengths\n- Excellent background";
        assert_eq!(decode_score(text), Ok(92));
    }

    #[test]
    fn test_spanish_and_french() {
        assert_eq!(decode_score("## Compatibilidad: 64/100"), Ok(64));
        assert_eq!(decode_score("## Compatibilité : 71 / 100"), Ok(71));
    }

    #[test]
    fn test_bold_markup_is_tolerated() {
        assert_eq!(decode_score("**Compatibility:** 58/100"), Ok(58));
        assert_eq!(decode_score("Compatibility Score: 40/100"), Ok(40));
    }

    #[test]
    fn test_generic_heading_fallback() {
        assert_eq!(decode_score("# Summary\n## Eignung: 66/100\n"), Ok(66));
    }

    #[test]
    fn test_clamps_to_100() {
        assert_eq!(decode_score("Compatibility: 150/100"), Ok(100));
        assert_eq!(decode_score("Compatibility: 99999999999999999999999/100"), Ok(100));
    }

    #[test]
    fn test_no_match_is_not_found() {
        assert_eq!(decode_score("Some text without score"), Err(ScoreDecodeError::NotFound));
        assert_eq!(decode_score("Some text"), Err(ScoreDecodeError::NotFound));
    }

    #[test]
    fn test_pattern_priority_beats_position() {
        let text = "## Overview: 40/100\n\nCompatibilidade: 70/100";
        assert_eq!(decode_score(text), Ok(70));
    }

    #[test]
    fn test_explicit_zero_is_decoded() {
        assert_eq!(decode_score("## Compatibility: 0/100"), Ok(0));
    }
}
