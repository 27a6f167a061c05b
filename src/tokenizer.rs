//! Pure tokenizer: text in, a finite ordered token sequence out.
//!
//! Grounded on the teacher's `search/tokenization.rs` stopword-table shape,
//! trimmed down to the closed ~40-word class spec §4.1 calls for — no
//! camelCase splitting, no programming-keyword table, since command-corpus
//! text is prose and shell syntax, not source identifiers.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Closed set of common English function words. Same term indexed and
/// queried means this list must never change between a build and a query
/// against that build.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "can", "did", "do", "does", "for",
        "from", "had", "has", "have", "how", "in", "into", "is", "it", "its", "me", "my", "of",
        "on", "or", "our", "should", "so", "than", "that", "the", "their", "them", "then",
        "there", "these", "this", "those", "to", "was", "we", "were", "what", "when", "where",
        "which", "who", "why", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Lightweight normalization: lowercase and collapse a handful of common
/// punctuation variants. Stands in for the NLP collaborator's `normalize`
/// routine (spec §4.1 step 1) — the tokenizer always calls this first.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Tokenize arbitrary text: normalize, split on any code point that is
/// neither a letter nor a decimal digit, drop tokens shorter than 2 chars,
/// drop stopwords. Identical for indexing and querying.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    normalized
        .split(|c: char| !(c.is_alphanumeric()))
        .filter(|tok| tok.len() >= 2)
        .filter(|tok| !is_stopword(tok))
        .map(|tok| tok.to_string())
        .collect()
}
