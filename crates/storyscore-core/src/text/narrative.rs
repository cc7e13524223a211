//! Narrative structure detection.
//!
//! A well-formed story reads "Como <rol> quiero <acción> para <beneficio>".
//! Two strategies are combined with OR:
//!
//! | Strategy | Input | Rule |
//! |----------|-------|------|
//! | Inline | whitespace-collapsed text | `como` … desire verb … `para`, in order |
//! | Block | each line, normalized | some line opens with each clause, any order |
//!
//! The block strategy recovers stories whose clauses are split across
//! separate lines or bullets.

use lazy_static::lazy_static;
use regex::Regex;

use super::lexicon::{DESIRE_VERBS, DESIRE_VERB_SET};

lazy_static! {
    static ref INLINE_NARRATIVE: Regex = Regex::new(&format!(
        r"(?i)\bcomo\b.*\b({})\b.*\bpara\b",
        DESIRE_VERBS.join("|")
    ))
    .unwrap();

    /// Markdown emphasis and label characters removed before block matching.
    static ref EMPHASIS: Regex = Regex::new(r"[*_~:`]").unwrap();
}

/// Check whether the text follows the role / want / purpose story shape.
pub fn has_narrative_structure(text: &str) -> bool {
    has_inline_narrative(text) || has_block_narrative(text)
}

/// Inline match on the whole text with whitespace (including newlines) collapsed.
pub fn has_inline_narrative(text: &str) -> bool {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    INLINE_NARRATIVE.is_match(&collapsed)
}

/// Block match: every clause must open some line and be followed by at least one word.
pub fn has_block_narrative(text: &str) -> bool {
    let mut role = false;
    let mut want = false;
    let mut purpose = false;

    for line in text.lines() {
        let normalized = normalize_line(line);
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let Some(first) = words.first() else {
            continue;
        };

        if *first == "como" && words.len() > 1 {
            role = true;
        }
        if opens_want_clause(&words) {
            want = true;
        }
        if *first == "para" && words.len() > 1 {
            purpose = true;
        }
    }

    role && want && purpose
}

fn normalize_line(line: &str) -> String {
    let lower = line.to_lowercase();
    EMPHASIS.replace_all(&lower, "").into_owned()
}

fn opens_want_clause(words: &[&str]) -> bool {
    match words {
        ["me", "gustaría", _, ..] => true,
        [first, _, ..] => DESIRE_VERB_SET.contains(*first),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_story_detected() {
        assert!(has_narrative_structure(
            "Como usuario quiero ver mi perfil para editarlo"
        ));
    }

    #[test]
    fn test_inline_is_case_insensitive_and_spans_newlines() {
        assert!(has_inline_narrative(
            "COMO administrador\nNECESITO exportar reportes\nPARA auditar"
        ));
        assert!(has_inline_narrative(
            "Como cliente me gustaría recibir alertas para no olvidar pagos"
        ));
    }

    #[test]
    fn test_inline_requires_order() {
        assert!(!has_inline_narrative(
            "Para ahorrar tiempo quiero pagar en línea como cliente"
        ));
    }

    #[test]
    fn test_block_story_detected() {
        let text = "Como cliente\nQuiero pagar en línea\nPara ahorrar tiempo";
        assert!(has_block_narrative(text));
        assert!(has_narrative_structure(text));
    }

    #[test]
    fn test_block_ignores_clause_order_and_emphasis() {
        let text = "**Para:** ahorrar tiempo\n\n*Como:* cliente frecuente\n`Quisiéramos` pagar en línea";
        assert!(has_block_narrative(text));
    }

    #[test]
    fn test_block_accepts_two_word_desire_verb() {
        let text = "Como analista\nMe gustaría filtrar pedidos\nPara encontrar errores";
        assert!(has_block_narrative(text));
    }

    #[test]
    fn test_block_clause_needs_following_word() {
        let text = "Como\nQuiero pagar en línea\nPara ahorrar tiempo";
        assert!(!has_block_narrative(text));

        let dangling = "Como cliente\nMe gustaría\nPara ahorrar tiempo";
        assert!(!has_block_narrative(dangling));
    }

    #[test]
    fn test_want_clause_alone_is_not_a_story() {
        assert!(!has_narrative_structure("Quiero ver mi perfil"));
    }

    #[test]
    fn test_clause_must_be_first_token() {
        let text = "El rol es como cliente\nQuiero pagar\nPara ahorrar";
        assert!(!has_block_narrative(text));
    }
}
