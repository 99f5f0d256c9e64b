//! Word tokenizers used by the scorers.
//!
//! Two flavors: plain whitespace splitting for n-gram/LCS/TF-IDF scoring and a
//! word-boundary scan with short-token filtering for keyword overlap.

use std::sync::LazyLock;

use regex::Regex;

/// Word-boundary pattern for keyword extraction
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("static word regex compiles"));

/// Tokens of this many characters or fewer are dropped by `keyword_tokens`
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Lowercase and split on whitespace.
pub fn whitespace_tokens(text: &str) -> Vec<String>
{
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lowercase, extract `\w+` runs and keep those longer than two characters.
pub fn keyword_tokens(text: &str) -> Vec<String>
{
    let lower = text.to_lowercase();

    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS)
        .map(str::to_string)
        .collect()
}
