//! C1: description quality.
//!
//! A description earns the weight when it is long enough to carry content
//! and shows either the narrative story shape or actionable language:
//!
//! ```text
//! score = weight  if (structure || verb || noun) && length_ok
//! length_ok       = words >= 15 || (verb && words >= 8)
//! ```
//!
//! The shorter threshold only applies with a verb: a short directive
//! sentence can still be meaningful, a short noun list cannot.

use crate::linguistic::FeatureExtractor;
use crate::text::{
    has_block_narrative, has_inline_narrative, is_valid_text, word_count, DESCRIPTION_NOUNS,
    DESCRIPTION_VERBS,
};
use crate::types::Issue;

use super::{Criterion, Evaluator, BULLET_MARKERS};

/// Minimum words for a description without a verb.
pub const MIN_WORDS: usize = 15;

/// Minimum words when the description contains a verb.
pub const MIN_WORDS_WITH_VERB: usize = 8;

/// Every predicate C1 looks at, computed once per text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescriptionSignals {
    pub valid: bool,

    /// Narrative "Como / quiero / para" shape
    pub structure: bool,

    /// The tagger answered for this text
    pub tagged: bool,

    /// Verb presence (tagger, or whitelist when the tagger cannot answer)
    pub verb: bool,

    /// Noun presence (tagger, or whitelist when the tagger cannot answer)
    pub noun: bool,

    pub whitelist_verb: bool,
    pub whitelist_noun: bool,

    /// Words after bullet markers are stripped
    pub word_count: usize,
}

impl DescriptionSignals {
    pub fn action(&self) -> bool {
        self.verb || self.noun
    }

    pub fn length_ok(&self) -> bool {
        self.word_count >= MIN_WORDS || (self.verb && self.word_count >= MIN_WORDS_WITH_VERB)
    }

    pub fn passes(&self) -> bool {
        self.valid && (self.structure || self.action()) && self.length_ok()
    }

    pub fn score(&self) -> u32 {
        Criterion::Description.award(self.passes())
    }
}

/// The C1 evaluator.
#[derive(Debug, Clone)]
pub struct DescriptionEvaluator {
    features: FeatureExtractor,
}

impl DescriptionEvaluator {
    pub fn new(features: FeatureExtractor) -> Self {
        Self { features }
    }

    /// Compute every C1 predicate for `text`.
    pub fn signals(&self, text: Option<&str>) -> DescriptionSignals {
        let Some(text) = text.filter(|t| is_valid_text(t)) else {
            return DescriptionSignals::default();
        };

        let cleaned = BULLET_MARKERS.replace_all(text, "").replace('\n', " ");
        let lexical = self
            .features
            .signals(&cleaned, DESCRIPTION_VERBS, DESCRIPTION_NOUNS);

        DescriptionSignals {
            valid: true,
            structure: has_inline_narrative(&cleaned) || has_block_narrative(text),
            tagged: lexical.tagged,
            verb: lexical.verb,
            noun: lexical.noun,
            whitelist_verb: lexical.whitelist_verb,
            whitelist_noun: lexical.whitelist_noun,
            word_count: word_count(&cleaned),
        }
    }

    /// Score a description text: 0 or 20.
    pub fn score_text(&self, text: Option<&str>) -> u32 {
        self.signals(text).score()
    }
}

impl Evaluator for DescriptionEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::Description
    }

    fn score(&self, issue: &Issue) -> u32 {
        self.score_text(issue.description.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linguistic::{PartOfSpeech, PosTagger, TaggedToken, TaggerError};
    use std::sync::Arc;

    /// Tags every token with the same class.
    struct UniformTagger(PartOfSpeech);

    impl PosTagger for UniformTagger {
        fn name(&self) -> &'static str {
            "uniform"
        }

        fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
            Ok(text
                .split_whitespace()
                .map(|w| TaggedToken {
                    text: w.to_string(),
                    pos: self.0,
                })
                .collect())
        }
    }

    fn evaluator_with(pos: PartOfSpeech) -> DescriptionEvaluator {
        DescriptionEvaluator::new(FeatureExtractor::with_tagger(Arc::new(UniformTagger(pos))))
    }

    fn words(n: usize) -> String {
        vec!["pedido"; n].join(" ")
    }

    #[test]
    fn test_invalid_text_scores_zero() {
        let evaluator = DescriptionEvaluator::new(FeatureExtractor::heuristic());
        assert_eq!(evaluator.score_text(None), 0);
        assert_eq!(evaluator.score_text(Some("   ")), 0);
        assert_eq!(evaluator.score_text(Some("*** --- •")), 0);
        assert!(!evaluator.signals(Some("")).valid);
    }

    #[test]
    fn test_fourteen_words_without_verb_fails_length_gate() {
        let evaluator = evaluator_with(PartOfSpeech::Noun);
        let signals = evaluator.signals(Some(&words(14)));
        assert!(signals.noun);
        assert!(!signals.verb);
        assert!(!signals.length_ok());
        assert_eq!(evaluator.score_text(Some(&words(14))), 0);
    }

    #[test]
    fn test_fifteen_words_with_noun_scores() {
        let evaluator = evaluator_with(PartOfSpeech::Noun);
        assert_eq!(evaluator.score_text(Some(&words(15))), 20);
    }

    #[test]
    fn test_fifteen_words_without_action_or_structure_scores_zero() {
        let evaluator = evaluator_with(PartOfSpeech::Function);
        assert_eq!(evaluator.score_text(Some(&words(15))), 0);
    }

    #[test]
    fn test_eight_words_with_verb_scores() {
        let evaluator = evaluator_with(PartOfSpeech::Verb);
        assert_eq!(evaluator.score_text(Some(&words(8))), 20);
        assert_eq!(evaluator.score_text(Some(&words(7))), 0);
    }

    #[test]
    fn test_bullets_do_not_count_as_words() {
        let evaluator = evaluator_with(PartOfSpeech::Noun);
        let text = "- pedido pedido\n- pedido pedido\n* pedido pedido\n• pedido pedido\n- pedido pedido\n- pedido pedido\n- pedido pedido";
        assert_eq!(evaluator.signals(Some(text)).word_count, 14);
        assert_eq!(evaluator.score_text(Some(text)), 0);
    }

    #[test]
    fn test_story_with_heuristic_tagger() {
        let evaluator = DescriptionEvaluator::new(FeatureExtractor::heuristic());
        let text = "Como usuario quiero ver mi perfil para editarlo";
        let signals = evaluator.signals(Some(text));

        assert!(signals.structure);
        assert!(signals.verb);
        assert_eq!(signals.word_count, 8);
        assert_eq!(evaluator.score_text(Some(text)), 20);
    }

    #[test]
    fn test_block_story_counts_as_structure() {
        let evaluator = DescriptionEvaluator::new(FeatureExtractor::without_tagger());
        let text = "Como cliente frecuente del portal web\nQuiero pagar mis facturas en línea sin filas\nPara ahorrar tiempo cada mes";
        let signals = evaluator.signals(Some(text));

        assert!(signals.structure);
        assert!(!signals.verb);
        assert!(signals.word_count >= MIN_WORDS);
        assert_eq!(evaluator.score_text(Some(text)), 20);
    }

    #[test]
    fn test_degraded_mode_uses_description_whitelists() {
        let evaluator = DescriptionEvaluator::new(FeatureExtractor::without_tagger());
        let text = "Implementar el reporte mensual de ventas por región comercial";
        let signals = evaluator.signals(Some(text));

        assert!(!signals.tagged);
        assert!(signals.whitelist_verb);
        assert!(signals.verb);
        assert_eq!(evaluator.score_text(Some(text)), 20);
    }

    #[test]
    fn test_noun_phrase_with_verb_like_endings_scores_zero() {
        let evaluator = DescriptionEvaluator::new(FeatureExtractor::heuristic());
        let text = "Tabla de los últimos préstamos y reclamos del mes";
        let signals = evaluator.signals(Some(text));

        assert!(signals.tagged);
        assert!(!signals.verb);
        assert_eq!(signals.word_count, 9);
        assert_eq!(evaluator.score_text(Some(text)), 0);
    }

    #[test]
    fn test_tagged_description_ignores_whitelist_verdict() {
        let evaluator = evaluator_with(PartOfSpeech::Function);
        let text = vec!["implementar"; 15].join(" ");
        let signals = evaluator.signals(Some(&text));

        assert!(signals.whitelist_verb);
        assert!(!signals.verb);
        assert!(!signals.noun);
        assert_eq!(evaluator.score_text(Some(&text)), 0);
    }
}
