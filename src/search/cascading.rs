//! Cascading booster (spec §4.8): a second multiplicative pass, applied
//! after reranking when NLP is active, that sums fixed contributions for
//! command-hint/action/context/target/keyword/intent-keyword matches.
//!
//! Grounded on the same plain `once_cell`-backed `Vec` membership-test
//! approach as `filters.rs` for the ~50-entry known-tool-name vocabulary
//! scan.

use crate::models::{Command, Intent, ProcessedQuery};
use once_cell::sync::Lazy;

/// The ~50-entry vocabulary of well-known tool names used to detect
/// "contexts" among query keywords.
static KNOWN_TOOL_VOCABULARY: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "git", "docker", "kubectl", "npm", "yarn", "cargo", "python", "pip", "node", "curl",
        "wget", "ssh", "rsync", "tar", "zip", "grep", "sed", "awk", "find", "make", "cmake",
        "terraform", "ansible", "aws", "gcloud", "azure", "helm", "jq", "yq", "go", "rustc",
        "java", "maven", "gradle", "ruby", "gem", "bundle", "php", "composer", "mysql", "psql",
        "redis", "mongo", "ffmpeg", "openssl", "gpg", "systemctl", "vim", "tmux", "nginx",
        "apache",
    ]
});

/// Fixed intent→keyword table used for the "intent keyword" contribution.
fn intent_keywords(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Find => &["find", "search", "locate"],
        Intent::View => &["view", "show", "display", "cat"],
        Intent::Create => &["create", "make", "new"],
        Intent::Delete => &["delete", "remove", "rm"],
        Intent::Modify => &["modify", "edit", "change"],
        Intent::Install => &["install", "setup", "add"],
        Intent::Run => &["run", "execute", "start"],
        Intent::Configure => &["configure", "config", "set"],
        Intent::Unknown => &[],
    }
}

/// "Whole word" test: substring with space sentinels on both sides, per
/// spec §4.8.
fn whole_word_contains(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let padded_haystack = format!(" {} ", haystack);
    let padded_needle = format!(" {} ", needle);
    padded_haystack.contains(&padded_needle)
}

struct BoostContext<'a> {
    action_terms: Vec<&'a str>,
    target_terms: Vec<&'a str>,
    keyword_terms: Vec<&'a str>,
    command_hints: Vec<&'a str>,
    contexts: Vec<&'a str>,
}

fn build_context<'a>(query: &'a ProcessedQuery) -> BoostContext<'a> {
    let action_terms: Vec<&str> = query.actions.iter().map(|s| s.as_str()).collect();
    let target_terms: Vec<&str> = query.targets.iter().map(|s| s.as_str()).collect();
    let keyword_terms: Vec<&str> = query.keywords.iter().map(|s| s.as_str()).collect();
    let command_hints: Vec<&str> = query.enhanced_keywords.iter().map(|s| s.as_str()).collect();
    let contexts: Vec<&str> = query
        .keywords
        .iter()
        .map(|s| s.as_str())
        .filter(|k| KNOWN_TOOL_VOCABULARY.contains(k))
        .collect();
    BoostContext {
        action_terms,
        target_terms,
        keyword_terms,
        command_hints,
        contexts,
    }
}

/// The §4.8 cascading multiplier `1 + Σ(contributions)` for a single
/// result. Each contribution fires at most once (first match).
pub fn cascading_multiplier(cmd: &Command, query: &ProcessedQuery) -> f64 {
    let ctx = build_context(query);
    let haystack = cmd.haystack_lower();
    let cmd_kw_haystack = format!("{} {} {}", cmd.command_lower, cmd.description_lower, cmd.keywords_lower);

    let mut total = 0.0;

    if ctx
        .command_hints
        .iter()
        .any(|hint| cmd.base_token_lower() == *hint)
    {
        total += 6.0;
    }

    if ctx
        .action_terms
        .iter()
        .any(|a| whole_word_contains(&cmd_kw_haystack, a))
    {
        total += 3.0;
    }

    if ctx
        .contexts
        .iter()
        .any(|c| cmd.command_lower.contains(c) || haystack.contains(c))
    {
        total += 2.5;
    }

    if ctx
        .target_terms
        .iter()
        .any(|t| whole_word_contains(&cmd_kw_haystack, t))
    {
        total += 2.0;
    }

    if ctx
        .keyword_terms
        .iter()
        .any(|k| whole_word_contains(&cmd_kw_haystack, k))
    {
        total += 1.5;
    }

    if let Some(intent) = query.intent {
        if intent_keywords(intent)
            .iter()
            .any(|kw| whole_word_contains(&haystack, kw))
        {
            total += 1.5;
        }
    }

    1.0 + total
}
