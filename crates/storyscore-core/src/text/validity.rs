//! Text validity guard.
//!
//! A field is valid only when it is present, non-blank after trimming, and
//! still carries at least one word character once every non-word character
//! is stripped. Unicode `\w` keeps accented Latin letters (á, ñ, ü, ...).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w]+").unwrap();
    static ref WORD_CHAR: Regex = Regex::new(r"\w").unwrap();
}

/// Check whether `text` carries any scorable content.
pub fn is_valid_text(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let stripped = NON_WORD.replace_all(text, "");
    WORD_CHAR.is_match(&stripped)
}

/// Same as [`is_valid_text`] for nullable tracker fields. `None` is invalid.
pub fn is_valid_field(text: Option<&str>) -> bool {
    text.map(is_valid_text).unwrap_or(false)
}
