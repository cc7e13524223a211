//! Fixed whitelists and token helpers.
//!
//! These are the deterministic fallback signals: they answer "is there an
//! action word here" without any part-of-speech model, so the evaluators keep
//! working when no tagger is loaded.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Desire verbs accepted in the want clause of a story ("quiero", "necesito", ...).
pub const DESIRE_VERBS: &[&str] = &[
    "quiero",
    "necesito",
    "busco",
    "me gustaría",
    "queremos",
    "quisiera",
    "quisiéramos",
    "necesitamos",
    "requiero",
    "deseo",
];

/// Action verbs that justify a description on their own.
pub const DESCRIPTION_VERBS: &[&str] = &[
    "crear",
    "desarrollar",
    "implementar",
    "validar",
    "mostrar",
    "generar",
    "obtener",
    "marcar",
];

/// Nouns that signal concrete work in a description.
pub const DESCRIPTION_NOUNS: &[&str] = &["validación", "consistencia", "ejecución", "documentación"];

/// Action verbs expected in acceptance criteria.
pub const CRITERIA_VERBS: &[&str] = &[
    "validar",
    "entregar",
    "realizar",
    "listar",
    "actualizar",
    "eliminar",
];

/// Nouns that make an acceptance criterion verifiable.
pub const CRITERIA_NOUNS: &[&str] = &["validación", "exactitud", "cumplimiento", "consistencia"];

lazy_static! {
    static ref WORD_TOKEN: Regex = Regex::new(r"\w+").unwrap();

    /// Single-word desire verbs, for token lookups.
    pub(crate) static ref DESIRE_VERB_SET: HashSet<&'static str> = DESIRE_VERBS
        .iter()
        .copied()
        .filter(|v| !v.contains(' '))
        .collect();
}

/// Split text into lowercase word tokens.
///
/// Punctuation and markdown markers are dropped; accented letters are kept.
///
/// ```ignore
/// assert_eq!(word_tokens("¡Validar *todo*!"), vec!["validar", "todo"]);
/// ```
pub fn word_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Check whether any whole token of `text` is in `verbs`.
///
/// This is the tagger-independent fallback: "validarlo" does not match
/// "validar", only the exact token does.
pub fn has_direct_verb(text: &str, verbs: &[&str]) -> bool {
    if verbs.is_empty() {
        return false;
    }
    word_tokens(text)
        .iter()
        .any(|token| verbs.contains(&token.as_str()))
}

/// Case-insensitive substring check against a whitelist.
pub fn contains_any(text: &str, terms: &[&str]) -> bool {
    let lower = text.to_lowercase();
    terms.iter().any(|term| lower.contains(term))
}
