//! Default rule-based implementation of the external NLP collaborator
//! (spec §3/§4.3 step 2). The retrieval core only depends on the
//! `ProcessedQuery` shape it produces, not on this specific heuristic —
//! this module is one concrete collaborator among possible others.
//!
//! No direct teacher counterpart (the teacher has no query-understanding
//! subsystem); grounded instead on the pack's retrieval-adjacent hybrid
//! search files that classify queries via a fixed lookup table, and reuses
//! the teacher's `get_stemmer()` `OnceLock<Stemmer>` pattern for stemming.

use crate::models::{Intent, ProcessedQuery};
use crate::tokenizer;
use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use std::sync::OnceLock;

fn get_stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Intent classification keywords: the first matching intent in this fixed
/// order wins. Order matters when a query matches more than one intent's
/// vocabulary (e.g. "show" also loosely overlaps "find").
static INTENT_KEYWORDS: Lazy<Vec<(Intent, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (Intent::Delete, vec!["delete", "remove", "rm", "del"]),
        (Intent::Create, vec!["create", "make", "mkdir", "touch", "new"]),
        (Intent::Install, vec!["install", "setup", "add"]),
        (Intent::Configure, vec!["configure", "config", "set"]),
        (Intent::Modify, vec!["modify", "edit", "change", "chmod", "chown"]),
        (Intent::Run, vec!["run", "execute", "exec", "start", "launch"]),
        (Intent::View, vec!["view", "show", "display", "print", "cat"]),
        (Intent::Find, vec!["find", "search", "locate", "list"]),
    ]
});

/// Small synonym table feeding both keyword enhancement and the cascading
/// booster's action/target term sets.
static SYNONYMS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    m.insert("compress", vec!["archive", "zip", "tar"]);
    m.insert("archive", vec!["compress", "zip", "tar"]);
    m.insert("delete", vec!["remove", "rm"]);
    m.insert("remove", vec!["delete", "rm"]);
    m.insert("find", vec!["search", "locate"]);
    m.insert("search", vec!["find", "locate"]);
    m.insert("directory", vec!["folder", "dir"]);
    m.insert("folder", vec!["directory", "dir"]);
    m.insert("file", vec!["document"]);
    m.insert("show", vec!["display", "view", "print"]);
    m.insert("display", vec!["show", "view", "print"]);
    m.insert("install", vec!["setup", "add"]);
    m.insert("copy", vec!["duplicate", "clone"]);
    m
});

/// Verbs recognized as "actions" (vs. the nouns recognized as "targets").
static ACTION_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "find", "search", "locate", "list", "view", "show", "display", "print", "create",
        "make", "delete", "remove", "modify", "edit", "change", "install", "setup", "add",
        "run", "execute", "start", "launch", "configure", "set", "compress", "archive",
        "extract", "copy", "move", "rename", "kill", "stop",
    ]
});

/// The minimal external-collaborator interface the core depends on.
pub trait QueryProcessor {
    fn process(&self, query: &str) -> ProcessedQuery;
}

/// Rule-based default: classify intent by first keyword match, split
/// tokens into actions/targets by a fixed verb list, and enhance keywords
/// via the synonym table. Does not stem its tokens — the intent/action/
/// synonym tables are keyed on unstemmed word forms, so `process` matches
/// against raw tokens; `stem` below is exposed separately for collaborators
/// that want it.
pub struct DefaultNlp;

impl QueryProcessor for DefaultNlp {
    fn process(&self, query: &str) -> ProcessedQuery {
        let tokens = tokenizer::tokenize(query);
        if tokens.is_empty() {
            return ProcessedQuery::default();
        }

        let intent = INTENT_KEYWORDS
            .iter()
            .find(|(_, words)| tokens.iter().any(|t| words.contains(&t.as_str())))
            .map(|(intent, _)| *intent);

        let mut actions = Vec::new();
        let mut targets = Vec::new();
        for tok in &tokens {
            if ACTION_WORDS.contains(&tok.as_str()) {
                actions.push(tok.clone());
            } else {
                targets.push(tok.clone());
            }
        }

        let mut enhanced_keywords = Vec::new();
        for tok in &tokens {
            if let Some(syns) = SYNONYMS.get(tok.as_str()) {
                for syn in syns {
                    if !tokens.iter().any(|t| t == syn) && !enhanced_keywords.contains(&syn.to_string()) {
                        enhanced_keywords.push(syn.to_string());
                    }
                }
            }
        }

        ProcessedQuery {
            intent,
            actions,
            targets,
            keywords: tokens,
            enhanced_keywords,
        }
    }
}

/// Stem a single token via the shared Snowball stemmer — exposed for
/// collaborators that want stemming without the full classification.
pub fn stem(token: &str) -> String {
    get_stemmer().stem(token).into_owned()
}
