//! Text heuristics shared by every rubric evaluator.
//!
//! - [`validity`] is the universal guard: blank or punctuation-only fields never score.
//! - [`narrative`] detects the "Como ... quiero ... para ..." story shape.
//! - [`lexicon`] holds the fixed whitelists and the token-level helpers
//!   that work without a part-of-speech tagger.

pub mod lexicon;
pub mod narrative;
pub mod validity;

pub use lexicon::{
    contains_any, has_direct_verb, word_count, word_tokens, CRITERIA_NOUNS, CRITERIA_VERBS,
    DESCRIPTION_NOUNS, DESCRIPTION_VERBS, DESIRE_VERBS,
};
pub use narrative::{has_block_narrative, has_inline_narrative, has_narrative_structure};
pub use validity::{is_valid_field, is_valid_text};
