//! C2: acceptance criteria quality.
//!
//! Criteria earn the weight when they are list-like and action-like.
//!
//! - **List-like**: at least 2 bulleted/numbered lines, or at least 2
//!   blank-line-separated paragraphs of 4+ words, or at least 2 plain lines
//!   of 3+ words.
//! - **Action-like**: a verb, a whitelisted criteria verb, or a whitelisted
//!   verification noun ("validación", "exactitud", ...).

use lazy_static::lazy_static;
use regex::Regex;

use crate::linguistic::FeatureExtractor;
use crate::text::{is_valid_text, word_count, CRITERIA_NOUNS, CRITERIA_VERBS};
use crate::types::Issue;

use super::{Criterion, Evaluator, BULLET_MARKERS};

lazy_static! {
    static ref LIST_ITEM: Regex = Regex::new(r"^\s*([-*•]|\d+\.)\s+.+").unwrap();
}

/// Minimum number of list items, paragraphs or plain lines.
pub const MIN_ITEMS: usize = 2;

const MIN_PARAGRAPH_WORDS: usize = 4;
const MIN_LINE_WORDS: usize = 3;

/// Every predicate C2 looks at, computed once per text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriteriaSignals {
    pub valid: bool,

    /// Bulleted or numbered lines
    pub list_items: usize,

    /// Blank-line-separated blocks with 4+ words
    pub paragraphs: usize,

    /// Lines with 3+ words
    pub plain_lines: usize,

    /// The tagger answered for this text
    pub tagged: bool,

    /// Verb presence (tagger, or whitelist when the tagger cannot answer)
    pub verb: bool,

    pub whitelist_verb: bool,
    pub whitelist_noun: bool,
}

impl CriteriaSignals {
    pub fn list_like(&self) -> bool {
        self.list_items >= MIN_ITEMS || self.paragraphs >= MIN_ITEMS || self.plain_lines >= MIN_ITEMS
    }

    pub fn action_like(&self) -> bool {
        self.verb || self.whitelist_verb || self.whitelist_noun
    }

    pub fn passes(&self) -> bool {
        self.valid && self.list_like() && self.action_like()
    }

    pub fn score(&self) -> u32 {
        Criterion::AcceptanceCriteria.award(self.passes())
    }
}

/// The C2 evaluator.
#[derive(Debug, Clone)]
pub struct AcceptanceCriteriaEvaluator {
    features: FeatureExtractor,
}

impl AcceptanceCriteriaEvaluator {
    pub fn new(features: FeatureExtractor) -> Self {
        Self { features }
    }

    /// Compute every C2 predicate for `text`.
    pub fn signals(&self, text: Option<&str>) -> CriteriaSignals {
        let Some(text) = text.filter(|t| is_valid_text(t)) else {
            return CriteriaSignals::default();
        };

        let text = text.replace("\r\n", "\n");
        let lines: Vec<&str> = text.lines().collect();

        let list_items = lines.iter().filter(|l| LIST_ITEM.is_match(l)).count();
        let paragraphs = text
            .split("\n\n")
            .filter(|block| word_count(block) >= MIN_PARAGRAPH_WORDS)
            .count();
        let plain_lines = lines
            .iter()
            .filter(|l| word_count(l) >= MIN_LINE_WORDS)
            .count();

        let cleaned = BULLET_MARKERS.replace_all(&text, "");
        let lexical = self
            .features
            .signals(&cleaned, CRITERIA_VERBS, CRITERIA_NOUNS);

        CriteriaSignals {
            valid: true,
            list_items,
            paragraphs,
            plain_lines,
            tagged: lexical.tagged,
            verb: lexical.verb,
            whitelist_verb: lexical.whitelist_verb,
            whitelist_noun: lexical.whitelist_noun,
        }
    }

    /// Score an acceptance-criteria text: 0 or 20.
    pub fn score_text(&self, text: Option<&str>) -> u32 {
        self.signals(text).score()
    }
}

impl Evaluator for AcceptanceCriteriaEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::AcceptanceCriteria
    }

    fn score(&self, issue: &Issue) -> u32 {
        self.score_text(issue.acceptance_criteria.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic() -> AcceptanceCriteriaEvaluator {
        AcceptanceCriteriaEvaluator::new(FeatureExtractor::heuristic())
    }

    fn whitelist_only() -> AcceptanceCriteriaEvaluator {
        AcceptanceCriteriaEvaluator::new(FeatureExtractor::without_tagger())
    }

    #[test]
    fn test_bulleted_list_with_verb_scores() {
        let text = "- El sistema debe registrar el pago\n- Se envía un correo de confirmación";
        let signals = heuristic().signals(Some(text));

        assert_eq!(signals.list_items, 2);
        assert!(signals.verb);
        assert_eq!(heuristic().score_text(Some(text)), 20);
    }

    #[test]
    fn test_numbered_list_detected() {
        let text = "1. Listar pedidos\n2. Eliminar pedidos vencidos\n3) no cuenta";
        let signals = whitelist_only().signals(Some(text));

        assert_eq!(signals.list_items, 2);
        assert!(signals.whitelist_verb);
        assert_eq!(whitelist_only().score_text(Some(text)), 20);
    }

    #[test]
    fn test_paragraphs_count_as_list() {
        let text = "Validar que el total coincida siempre.\n\nEl reporte queda disponible para auditoría.";
        let signals = whitelist_only().signals(Some(text));

        assert_eq!(signals.paragraphs, 2);
        assert!(signals.list_like());
    }

    #[test]
    fn test_plain_lines_fallback() {
        let text = "Se verifica la exactitud del monto\nSe muestra el recibo final";
        let signals = whitelist_only().signals(Some(text));

        assert_eq!(signals.list_items, 0);
        assert_eq!(signals.plain_lines, 2);
        assert!(signals.whitelist_noun);
        assert_eq!(whitelist_only().score_text(Some(text)), 20);
    }

    #[test]
    fn test_single_line_is_not_a_list() {
        let text = "El sistema debe validar el pago del cliente";
        let signals = heuristic().signals(Some(text));

        assert!(!signals.list_like());
        assert!(signals.action_like());
        assert_eq!(heuristic().score_text(Some(text)), 0);
    }

    #[test]
    fn test_list_without_action_scores_zero() {
        let text = "- Pantalla principal del módulo\n- Botón azul del formulario";
        let signals = heuristic().signals(Some(text));

        assert!(signals.list_like());
        assert!(!signals.action_like());
        assert_eq!(heuristic().score_text(Some(text)), 0);
    }

    #[test]
    fn test_noun_list_with_verb_like_endings_scores_zero() {
        let text = "- Tabla de préstamos vigentes\n- Montos máximos por cliente";
        let signals = heuristic().signals(Some(text));

        assert!(signals.list_like());
        assert!(signals.tagged);
        assert!(!signals.verb);
        assert!(!signals.action_like());
        assert_eq!(heuristic().score_text(Some(text)), 0);
    }

    #[test]
    fn test_windows_line_endings() {
        let text = "- Listar facturas pendientes\r\n- Actualizar estado de factura";
        assert_eq!(whitelist_only().signals(Some(text)).list_items, 2);
    }

    #[test]
    fn test_invalid_scores_zero() {
        assert_eq!(heuristic().score_text(None), 0);
        assert_eq!(heuristic().score_text(Some("\n\n- \n- ")), 0);
    }
}
