//! Text cleanup utilities
//!
//! Helpers for normalizing extracted text before it is fingerprinted,
//! compared or handed to a translator.

use once_cell::sync::Lazy;
use regex::Regex;

static ARABIC_SCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x{0600}-\x{06FF}]").unwrap());

/// Fold non-breaking spaces, collapse whitespace runs and trim.
pub fn normalize_text(text: &str) -> String {
    text.replace('\u{00A0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a table cell, joining its lines with ` / `.
pub(crate) fn normalize_cell_text(text: &str) -> String {
    normalize_text(&text.replace('\n', " / "))
}

pub fn has_arabic(text: &str) -> bool {
    ARABIC_SCRIPT.is_match(text)
}

/// `"ar"` when the sample contains Arabic-block characters, `"en"` otherwise.
pub fn language_hint(sample: &str) -> &'static str {
    if has_arabic(sample) { "ar" } else { "en" }
}

/// First `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
