//! Core data types shared across the retrieval pipeline.
//!
//! These are plain, `serde`-friendly structs with no behavior beyond small
//! constructors and accessors — the algorithms that consume them live in
//! `tokenizer`, `index`, `search`, and `cache`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One of the four searchable fields of a [`Command`], in the fixed order
/// used everywhere a per-field array is indexed by `Field as usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Command,
    Description,
    Keywords,
    Tags,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Command, Field::Description, Field::Keywords, Field::Tags];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single shell command entry in the corpus.
///
/// Immutable after the corpus is built; `docID` is this command's position
/// in the owning `Corpus`'s backing `Vec`, not stored on the struct itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub command: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub platform: Vec<String>,
    #[serde(default)]
    pub pipeline: bool,
    #[serde(default)]
    pub niche: Option<String>,

    /// Precomputed lowercase copies of the four text fields, populated once
    /// at load time so the hot query path never re-lowercases anything.
    #[serde(skip, default)]
    pub command_lower: String,
    #[serde(skip, default)]
    pub description_lower: String,
    #[serde(skip, default)]
    pub keywords_lower: String,
    #[serde(skip, default)]
    pub tags_lower: String,
}

impl Command {
    /// Populate the lowercase caches. Called exactly once, by the corpus
    /// loader, right after deserialization.
    pub fn finalize(&mut self) {
        self.command_lower = self.command.to_lowercase();
        self.description_lower = self.description.to_lowercase();
        self.keywords_lower = self.keywords.join(" ").to_lowercase();
        self.tags_lower = self.tags.join(" ").to_lowercase();
    }

    /// Raw text of a given field, pre-lowercased.
    pub fn field_lower(&self, field: Field) -> &str {
        match field {
            Field::Command => &self.command_lower,
            Field::Description => &self.description_lower,
            Field::Keywords => &self.keywords_lower,
            Field::Tags => &self.tags_lower,
        }
    }

    /// `command + " " + description`, lowercased — the haystack used by the
    /// fuzzy fallback and several boost stages.
    pub fn haystack_lower(&self) -> String {
        format!("{} {}", self.command_lower, self.description_lower)
    }

    /// The first whitespace-separated token of `command`, lowercased — used
    /// by the legacy cross-platform tool allowlist.
    pub fn base_token_lower(&self) -> &str {
        self.command_lower.split_whitespace().next().unwrap_or("")
    }
}

/// Per-field term frequency counts for a single posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldTf(pub [u32; 4]);

impl FieldTf {
    pub fn get(&self, field: Field) -> u32 {
        self.0[field.index()]
    }

    pub fn add(&mut self, field: Field, n: u32) {
        self.0[field.index()] += n;
    }
}

/// A single posting: one document that contains a term, with the
/// per-field frequency of that term inside that document.
#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: usize,
    pub field_tf: FieldTf,
}

/// Intent classes produced by the NLP collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Find,
    View,
    Create,
    Delete,
    Modify,
    Install,
    Run,
    Configure,
    Unknown,
}

/// The output of the external NLP collaborator (spec §3: `ProcessedQuery`).
/// The retrieval core only ever consumes this shape; how it's produced is
/// out of scope for the core (see `nlp` module for a concrete default).
#[derive(Debug, Clone, Default)]
pub struct ProcessedQuery {
    pub intent: Option<Intent>,
    pub actions: Vec<String>,
    pub targets: Vec<String>,
    pub keywords: Vec<String>,
    pub enhanced_keywords: Vec<String>,
}

impl ProcessedQuery {
    pub fn is_empty(&self) -> bool {
        self.intent.is_none()
            && self.actions.is_empty()
            && self.targets.is_empty()
            && self.keywords.is_empty()
            && self.enhanced_keywords.is_empty()
    }
}

/// Per-call search options (spec §3: `SearchOptions`).
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub limit: usize,
    pub context_boosts: HashMap<String, f64>,
    pub pipeline_only: bool,
    pub pipeline_boost: f64,
    pub use_fuzzy: bool,
    pub fuzzy_threshold: Option<i64>,
    pub use_nlp: bool,
    pub top_terms_cap: usize,
    pub all_platforms: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            context_boosts: HashMap::new(),
            pipeline_only: false,
            pipeline_boost: 0.0,
            use_fuzzy: true,
            fuzzy_threshold: None,
            use_nlp: true,
            top_terms_cap: 10,
            all_platforms: false,
        }
    }
}

impl SearchOptions {
    /// The effective limit per spec §4.3 step 11: non-positive becomes 10.
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            10
        } else {
            self.limit
        }
    }
}

/// A single scored hit (spec §3: `SearchResult`). Carries a `doc_id` rather
/// than a reference/pointer to the matched `Command`, per spec §9's design
/// note that pointer identity doesn't survive an index rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub doc_id: usize,
    pub score: f64,
}

impl SearchResult {
    /// Resolve this result against a corpus slice. `None` if `doc_id` is
    /// out of range (e.g. a cached result from a since-rebuilt, smaller
    /// corpus).
    pub fn command<'a>(&self, corpus: &'a [Command]) -> Option<&'a Command> {
        corpus.get(self.doc_id)
    }
}

/// Aggregate counters for the result cache (spec §6: `CacheStats`).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
