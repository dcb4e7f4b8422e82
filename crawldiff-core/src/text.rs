// Text preparation for similarity scoring

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

// Word characters, apostrophes and internal hyphens, anchored on word boundaries.
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").expect("valid regex"));

const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201c}', "\""),
    ('\u{201d}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2026}', "..."),
    ('\u{00a0}', " "),
    ('\u{00ad}', ""),
];

/// NFC-compose, lowercase, fold typographic punctuation to ASCII and
/// collapse whitespace runs into single spaces.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let composed: String = text.nfc().collect::<String>().to_lowercase();

    let mut folded = String::with_capacity(composed.len());
    for c in composed.chars() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => folded.push_str(to),
            None => folded.push(c),
        }
    }

    WHITESPACE.replace_all(&folded, " ").trim().to_string()
}

/// Split normalized text into word tokens, keeping hyphenated words whole.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    WORD.find_iter(text)
        .map(|m| m.as_str())
        .filter(|t| !t.is_empty() && *t != "'" && *t != "-")
        .map(String::from)
        .collect()
}
