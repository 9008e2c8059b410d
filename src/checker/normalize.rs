use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ALPHABETIC_RUN: Regex = Regex::new(r"[A-Za-z]+").unwrap();
}

/// How a backend's raw output tokens are reduced to bare words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// Strip nested surrounding quotes and whitespace.
    Quotes,
    /// Keep the first run of ASCII letters.
    AlphabeticRun,
}

impl Normalizer {
    pub fn normalize(self, word: &str) -> String {
        match self {
            Normalizer::Quotes => strip_quotes(word),
            Normalizer::AlphabeticRun => alphabetic_run(word),
        }
    }
}

/// Peel quotes and whitespace off both ends until nothing changes.
///
/// Returns an empty string when the remainder has no ASCII letter in it.
pub fn strip_quotes(word: &str) -> String {
    let mut current = word.trim();
    loop {
        let next = current
            .trim()
            .trim_matches(|c: char| c == '\'' || c == '"')
            .trim();
        if next == current {
            break;
        }
        current = next;
    }

    if current.bytes().any(|b| b.is_ascii_alphabetic()) {
        current.to_string()
    } else {
        String::new()
    }
}

pub fn alphabetic_run(word: &str) -> String {
    ALPHABETIC_RUN
        .find(word)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
