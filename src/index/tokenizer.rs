use regex::Regex;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("token pattern is valid"));

/// A normalized term and its 0-based position among the terms of its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub position: u32,
}

/// The single normalization used for both segment text and queries:
/// lowercase, then split on anything that is not a letter or a digit.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(&text.to_lowercase())
        .enumerate()
        .map(|(position, m)| Token {
            term: m.as_str().to_string(),
            position: position as u32,
        })
        .collect()
}

/// Terms only, in order, duplicates kept.
pub fn terms(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|t| t.term).collect()
}
