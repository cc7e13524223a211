//! Part-of-speech signals for the rubric evaluators.
//!
//! The evaluators only need two questions answered: "is there a verb" and
//! "is there a noun". Any tagger that can classify Spanish tokens answers them;
//! it is injected once through [`FeatureExtractor`] and queried read-only for
//! the rest of the run.
//!
//! ## Degraded mode
//!
//! Tagging is best-effort. When no tagger is configured, or the tagger fails
//! on a given text, [`FeatureExtractor::has_verb`] and
//! [`FeatureExtractor::has_noun`] fall back to the fixed whitelists in
//! [`crate::text::lexicon`]. Scoring never fails because of the tagger.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::text::lexicon::{contains_any, has_direct_verb, DESIRE_VERBS};

/// Errors a tagger may report. The extractor never propagates them.
#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("Tagger unavailable: {0}")]
    Unavailable(String),

    #[error("Tagging failed: {0}")]
    Failed(String),
}

/// Coarse part-of-speech classes.
///
/// `Auxiliary` is separate from `Verb`: "es", "está", "ha" do not
/// count as action verbs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Verb,
    Auxiliary,
    Noun,
    ProperNoun,
    Adjective,
    Function,
    Number,
    Other,
}

impl PartOfSpeech {
    pub fn is_verb(&self) -> bool {
        matches!(self, PartOfSpeech::Verb)
    }

    pub fn is_noun(&self) -> bool {
        matches!(self, PartOfSpeech::Noun)
    }
}

/// A token and its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    pub pos: PartOfSpeech,
}

/// A part-of-speech tagging capability.
///
/// Implementations must be shareable across scoring threads; the extractor
/// holds one instance for the whole run.
pub trait PosTagger: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Tag every word token of `text`.
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError>;
}

/// Verb/noun presence for one text, computed with a single tagger call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosProfile {
    /// Whether the tagger answered for this text
    pub tagged: bool,
    pub verb: bool,
    pub noun: bool,
}

/// Verb/noun presence after applying the whitelist fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicalSignals {
    pub tagged: bool,
    /// Tagger verdict when tagged, whitelist verdict otherwise
    pub verb: bool,
    pub noun: bool,
    pub whitelist_verb: bool,
    pub whitelist_noun: bool,
}

/// Answers verb/noun presence questions, with or without a tagger.
#[derive(Clone)]
pub struct FeatureExtractor {
    tagger: Option<Arc<dyn PosTagger>>,
}

impl FeatureExtractor {
    /// Use the given tagger for every query.
    pub fn with_tagger(tagger: Arc<dyn PosTagger>) -> Self {
        Self {
            tagger: Some(tagger),
        }
    }

    /// Whitelist-only extractor.
    pub fn without_tagger() -> Self {
        Self { tagger: None }
    }

    /// Extractor backed by the built-in [`HeuristicTagger`].
    pub fn heuristic() -> Self {
        Self::with_tagger(Arc::new(HeuristicTagger::new()))
    }

    pub fn tagger_available(&self) -> bool {
        self.tagger.is_some()
    }

    /// Tag `text` once and report verb/noun presence.
    ///
    /// `tagged` is false when no tagger is configured or the tagger failed.
    pub fn profile(&self, text: &str) -> PosProfile {
        let Some(tagger) = &self.tagger else {
            return PosProfile::default();
        };

        match tagger.tag(text) {
            Ok(tokens) => PosProfile {
                tagged: true,
                verb: tokens.iter().any(|t| t.pos.is_verb()),
                noun: tokens.iter().any(|t| t.pos.is_noun()),
            },
            Err(e) => {
                tracing::warn!(tagger = tagger.name(), error = %e, "falling back to whitelist signals");
                PosProfile::default()
            }
        }
    }

    /// Tagger-only verb signal. False without a working tagger.
    pub fn tagged_verb(&self, text: &str) -> bool {
        self.profile(text).verb
    }

    /// Tagger-only noun signal. False without a working tagger.
    pub fn tagged_noun(&self, text: &str) -> bool {
        self.profile(text).noun
    }

    /// Tag `text` once and resolve verb/noun presence.
    ///
    /// The tagger's answer wins whenever it has one; the whitelists decide
    /// only when it cannot answer. Whitelist hits are always reported.
    pub fn signals(
        &self,
        text: &str,
        fallback_verbs: &[&str],
        fallback_nouns: &[&str],
    ) -> LexicalSignals {
        let profile = self.profile(text);
        let whitelist_verb = has_direct_verb(text, fallback_verbs);
        let whitelist_noun = contains_any(text, fallback_nouns);
        let (verb, noun) = if profile.tagged {
            (profile.verb, profile.noun)
        } else {
            (whitelist_verb, whitelist_noun)
        };

        LexicalSignals {
            tagged: profile.tagged,
            verb,
            noun,
            whitelist_verb,
            whitelist_noun,
        }
    }

    /// Verb presence, falling back to a whitelist when the tagger cannot answer.
    pub fn has_verb(&self, text: &str, fallback_verbs: &[&str]) -> bool {
        self.signals(text, fallback_verbs, &[]).verb
    }

    /// Noun presence, falling back to a whitelist when the tagger cannot answer.
    pub fn has_noun(&self, text: &str, fallback_nouns: &[&str]) -> bool {
        self.signals(text, &[], fallback_nouns).noun
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("tagger", &self.tagger.as_ref().map(|t| t.name()))
            .finish()
    }
}

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\w+").unwrap();

    /// Articles, prepositions, pronouns, conjunctions and common adverbs.
    static ref FUNCTION_WORDS: HashSet<&'static str> = {
        let words = [
            // Articles and contractions
            "el", "la", "los", "las", "un", "una", "unos", "unas", "lo", "al", "del",
            // Prepositions
            "a", "ante", "bajo", "con", "contra", "de", "desde", "durante", "en", "entre",
            "hacia", "hasta", "mediante", "por", "para", "según", "sin", "sobre", "tras",
            // Conjunctions
            "y", "e", "o", "u", "ni", "pero", "sino", "que", "como", "cuando", "donde",
            "si", "porque", "pues", "aunque", "mientras",
            // Pronouns and possessives
            "yo", "tú", "él", "ella", "ello", "nosotros", "nosotras", "ellos", "ellas",
            "usted", "ustedes", "me", "te", "se", "nos", "le", "les",
            "mi", "mis", "tu", "tus", "su", "sus", "nuestro", "nuestra", "nuestros", "nuestras",
            "este", "esta", "estos", "estas", "ese", "esa", "esos", "esas", "aquel", "aquella",
            "esto", "eso", "cual", "cuales", "quien", "quienes", "qué", "cómo", "cuándo", "dónde",
            // Quantifiers and adverbs
            "todo", "toda", "todos", "todas", "cada", "otro", "otra", "otros", "otras",
            "algún", "alguno", "alguna", "ningún", "ninguno", "ninguna", "nada", "algo",
            "no", "sí", "muy", "más", "menos", "ya", "también", "tampoco", "tan", "solo",
            "aquí", "allí", "ahora", "luego", "siempre", "nunca", "bien", "mal", "etc",
        ];
        words.into_iter().collect()
    };

    static ref AUXILIARIES: HashSet<&'static str> = {
        let words = [
            "es", "son", "ser", "era", "eran", "fue", "fueron", "sea", "sean", "sido", "siendo",
            "será", "serán", "está", "están", "estar", "estaba", "estaban", "esté", "estén",
            "estará", "estarán", "ha", "han", "he", "hemos", "haber", "había", "habrá", "hay",
        ];
        words.into_iter().collect()
    };

    /// Conjugated forms the suffix rules cannot see.
    static ref VERB_FORMS: HashSet<&'static str> = {
        let mut words: HashSet<&'static str> = [
            "ver", "dar", "ir", "gustaría", "puede", "pueda", "pueden", "puedan", "permite", "permita", "permitan",
            "debe", "deba", "deben", "deban", "tiene", "tenga", "tienen", "tengan",
            "hace", "haga", "hacen", "hagan", "veo", "vea", "vean", "muestra", "muestre",
            "muestren", "genera", "genere", "valida", "valide", "crea", "cree", "guarda",
            "guarde", "envía", "envíe", "recibe", "reciba", "actualiza", "actualice",
            "elimina", "elimine", "registra", "registre", "consulta", "consulte",
            "selecciona", "seleccione", "ingresa", "ingrese", "descarga", "descargue",
            "exporta", "exporte", "incluye", "incluya", "contiene", "contenga",
        ]
        .into_iter()
        .collect();
        words.extend(DESIRE_VERBS.iter().copied().filter(|v| !v.contains(' ')));
        words
    };

    /// Words ending like an infinitive that are not verbs.
    static ref INFINITIVE_EXCEPTIONS: HashSet<&'static str> = {
        let words = [
            "lugar", "hogar", "mujer", "ayer", "altar", "azúcar", "collar", "dólar", "militar",
            "popular", "similar", "regular", "familiar", "particular", "celular", "titular",
            "auxiliar", "solar", "polar", "taller", "carácter", "alquiler", "líder", "máster",
            "póster", "láser", "placer", "nadir", "elixir", "emir",
        ];
        words.into_iter().collect()
    };

    /// Nouns and adjectives with a gerund or first-person-plural ending.
    static ref VERB_SUFFIX_EXCEPTIONS: HashSet<&'static str> = {
        let words = [
            "comando", "mando", "bando", "contrabando", "blando", "nefando", "fernando",
            "reclamos", "extremos", "supremos", "ramos", "primos", "racimos", "remos",
        ];
        words.into_iter().collect()
    };
}

const INFINITIVE_SUFFIXES: &[&str] = &["ar", "er", "ir", "ír"];
const CLITIC_SUFFIXES: &[&str] = &["lo", "la", "los", "las", "le", "les", "se"];
const GERUND_SUFFIXES: &[&str] = &["ando", "iendo", "yendo"];
const PLURAL_FIRST_PERSON_SUFFIXES: &[&str] = &["amos", "emos", "imos"];
/// The only written accents a first-person-plural verb form carries.
const ACCENTED_PLURAL_ENDINGS: &[&str] = &["íamos", "ábamos"];
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "oso", "osa", "osos", "osas", "ble", "bles", "ivo", "iva", "ivos", "ivas", "ico", "ica",
    "icos", "icas", "ísimo", "ísima", "ísimos", "ísimas",
];

/// Rule-based Spanish tagger.
///
/// Needs no model files: closed-class lexicons, a list of common conjugated
/// forms, and suffix rules for infinitives (with clitics), gerunds and
/// first-person plurals, minus known nouns that share those endings.
/// Remaining alphabetic content words default to `Noun`, capitalized ones
/// inside a sentence to `ProperNoun`.
#[derive(Debug, Clone, Default)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    pub fn new() -> Self {
        Self
    }

    /// Classify a single lowercase word.
    pub fn classify(&self, word: &str) -> PartOfSpeech {
        if word.chars().all(|c| c.is_numeric()) {
            return PartOfSpeech::Number;
        }
        if !word.chars().any(|c| c.is_alphabetic()) {
            return PartOfSpeech::Other;
        }
        if FUNCTION_WORDS.contains(word) {
            return PartOfSpeech::Function;
        }
        if AUXILIARIES.contains(word) {
            return PartOfSpeech::Auxiliary;
        }
        if VERB_FORMS.contains(word) {
            return PartOfSpeech::Verb;
        }
        if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) && word.chars().count() > 4 {
            return PartOfSpeech::Adjective;
        }
        if Self::looks_like_verb(word) {
            return PartOfSpeech::Verb;
        }
        if word.chars().count() < 2 {
            return PartOfSpeech::Other;
        }
        PartOfSpeech::Noun
    }

    fn looks_like_verb(word: &str) -> bool {
        let len = word.chars().count();

        if len >= 4 && !INFINITIVE_EXCEPTIONS.contains(word) && Self::is_infinitive(word) {
            return true;
        }

        // Infinitive with attached clitic: "editarlo", "mostrarles", "registrarse"
        if len >= 6 {
            for clitic in CLITIC_SUFFIXES {
                if let Some(stem) = word.strip_suffix(clitic) {
                    if stem.chars().count() >= 4 && Self::is_infinitive(stem) {
                        return true;
                    }
                }
            }
        }

        if VERB_SUFFIX_EXCEPTIONS.contains(word) {
            return false;
        }

        if len >= 5 && GERUND_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return true;
        }

        len >= 6 && Self::is_first_person_plural(word)
    }

    /// "-amos/-emos/-imos" with no written accent, or an imperfect/conditional
    /// ending. "préstamos", "últimos" and "máximos" are rejected by their accent.
    fn is_first_person_plural(word: &str) -> bool {
        if !PLURAL_FIRST_PERSON_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return false;
        }
        let accented = word
            .chars()
            .any(|c| matches!(c, 'á' | 'é' | 'í' | 'ó' | 'ú'));
        !accented || ACCENTED_PLURAL_ENDINGS.iter().any(|s| word.ends_with(s))
    }

    fn is_infinitive(word: &str) -> bool {
        INFINITIVE_SUFFIXES.iter().any(|s| word.ends_with(s))
    }
}

impl PosTagger for HeuristicTagger {
    fn name(&self) -> &'static str {
        "heuristic-es"
    }

    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
        let mut tokens = Vec::new();
        let mut sentence_start = true;
        let mut last_end = 0;

        for m in TOKEN.find_iter(text) {
            let gap = &text[last_end..m.start()];
            if gap.contains(|c: char| matches!(c, '.' | '!' | '?' | '\n' | ':' | ';')) {
                sentence_start = true;
            }
            last_end = m.end();

            let raw = m.as_str();
            let word = raw.to_lowercase();
            let mut pos = self.classify(&word);

            let capitalized = raw.chars().next().map(char::is_uppercase).unwrap_or(false);
            if pos == PartOfSpeech::Noun && capitalized && !sentence_start {
                pos = PartOfSpeech::ProperNoun;
            }

            tokens.push(TaggedToken { text: word, pos });
            sentence_start = false;
        }

        Ok(tokens)
    }
}
