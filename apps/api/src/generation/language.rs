//! Output language resolution for generated materials.
//!
//! An explicit language is used verbatim. `auto` inspects the job description
//! for cue words; cue sets are checked in a fixed order (Portuguese, Spanish,
//! French) and the first set with any hit wins. No hit means English.

use std::collections::HashSet;

pub const AUTO: &str = "auto";
pub const ENGLISH: &str = "en";

/// Cue sets in priority order. Words shared between languages are left out so a
/// single hit is meaningful.
const LANGUAGE_CUES: &[(&str, &[&str])] = &[
    (
        "pt",
        &[
            "vaga",
            "você",
            "experiência",
            "conhecimento",
            "conhecimentos",
            "atividades",
            "benefícios",
            "desenvolvimento",
            "trabalho",
            "equipe",
        ],
    ),
    (
        "es",
        &[
            "experiencia",
            "conocimientos",
            "puesto",
            "empleo",
            "beneficios",
            "desarrollo",
            "trabajo",
            "equipo",
            "usted",
        ],
    ),
    (
        "fr",
        &[
            "poste",
            "expérience",
            "compétences",
            "entreprise",
            "vous",
            "nous",
            "développement",
            "équipe",
            "avantages",
        ],
    ),
];

/// Resolves the language code generation should write in.
pub fn resolve_language(requested: &str, job_description: &str) -> String {
    let requested = requested.trim();
    if !requested.is_empty() && !requested.eq_ignore_ascii_case(AUTO) {
        return requested.to_string();
    }

    let folded = job_description.to_lowercase();
    let words: HashSet<&str> = folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    LANGUAGE_CUES
        .iter()
        .find(|(_, cues)| cues.iter().any(|cue| words.contains(cue)))
        .map(|(code, _)| code.to_string())
        .unwrap_or_else(|| ENGLISH.to_string())
}

/// Human-readable language name used inside prompts.
pub fn language_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "pt" | "pt-br" => "Brazilian Portuguese".to_string(),
        "es" => "Spanish".to_string(),
        "fr" => "French".to_string(),
        "en" => "English".to_string(),
        _ => code.to_string(),
    }
}

/// Heading the insights document must open with, e.g. `Compatibilidade`.
pub fn score_heading(code: &str) -> &'static str {
    match code.to_lowercase().as_str() {
        "pt" | "pt-br" => "Compatibilidade",
        "es" => "Compatibilidad",
        "fr" => "Compatibilité",
        _ => "Compatibility",
    }
}
