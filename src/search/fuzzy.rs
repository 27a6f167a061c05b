//! Fuzzy fallback (spec §4.7), used only when BM25F yields no tokens or no
//! hits. New dependency not in the teacher's own stack but attested
//! elsewhere in the pack for exactly this fallback role (`kxrm-semisearch`
//! uses `fuzzy-matcher` for its own subsequence fallback).
//!
//! Spec §9 Open Question: the source describes a *negative*-score
//! subsequence matcher where better matches are less negative. The
//! `fuzzy-matcher` crate's `SkimMatcherV2` instead returns a *positive*
//! score where higher is better, with no fixed upper bound. Rather than
//! invert its sign to chase the source's convention, this keeps the
//! crate's native convention and re-derives the spec's normalization
//! formula around it: `(score / (score + BASE)).clamp(0.0, 1.0)`, which
//! preserves the same shape (monotonic, asymptotic to 1, 0 at score 0)
//! without requiring a sign flip.

use crate::models::{Command, SearchResult};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use once_cell::sync::Lazy;

const BASE: f64 = 100.0;

static MATCHER: Lazy<SkimMatcherV2> = Lazy::new(SkimMatcherV2::default);

fn normalize_score(raw: i64) -> f64 {
    let raw = raw.max(0) as f64;
    (raw / (raw + BASE)).clamp(0.0, 1.0)
}

/// Run the subsequence fuzzy fallback over `commands`, returning at most
/// `2 * limit` results satisfying `score >= fuzzy_threshold` (if given),
/// sorted descending by score.
pub fn fuzzy_search(
    commands: &[Command],
    query: &str,
    limit: usize,
    fuzzy_threshold: Option<i64>,
) -> Vec<SearchResult> {
    let mut scored: Vec<(usize, i64)> = commands
        .iter()
        .enumerate()
        .filter_map(|(doc_id, cmd)| {
            let haystack = cmd.haystack_lower();
            MATCHER
                .fuzzy_match(&haystack, query)
                .map(|score| (doc_id, score))
        })
        .filter(|(_, score)| fuzzy_threshold.map_or(true, |t| *score >= t))
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(2 * limit);

    scored
        .into_iter()
        .map(|(doc_id, raw)| SearchResult {
            doc_id,
            score: normalize_score(raw),
        })
        .filter(|r| r.score > 0.0)
        .collect()
}
