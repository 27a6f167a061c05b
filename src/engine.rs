//! Wires the corpus, inverted index, TF-IDF model, embedding index, result
//! cache, and NLP collaborator into the `Search`/`BuildIndex`/`Invalidate`/
//! `Stats` interface spec §6 exposes, with the exclusive-swap rebuild model
//! spec §5 specifies: build the new structures off to the side, then swap
//! the shared pointer atomically and invalidate the cache; in-flight
//! queries complete against the old snapshot.

use crate::cache::{CacheKey, ResultCache};
use crate::index::{Bm25Params, EmbeddingIndex, InvertedIndex, TfIdfModel};
use crate::models::{CacheStats, Command, SearchOptions, SearchResult};
use crate::nlp::QueryProcessor;
use crate::search::pipeline::{self, Snapshot};
use std::sync::{Arc, RwLock};
use std::time::Duration;

struct EngineSnapshot {
    corpus: Vec<Command>,
    index: InvertedIndex,
    tfidf: Option<TfIdfModel>,
    embedding: Option<EmbeddingIndex>,
}

impl EngineSnapshot {
    fn build(corpus: Vec<Command>, params: Bm25Params, embedding: Option<EmbeddingIndex>) -> Self {
        let index = InvertedIndex::build(&corpus, params);
        let tfidf = if corpus.is_empty() {
            None
        } else {
            Some(TfIdfModel::build(&corpus))
        };
        Self {
            corpus,
            index,
            tfidf,
            embedding,
        }
    }
}

/// The top-level retrieval engine. Read-heavy structures are shared via
/// `Arc` behind a single `RwLock` that is held only for the instant of
/// swapping the pointer, not for the duration of a query (spec §5).
pub struct SearchEngine {
    snapshot: RwLock<Arc<EngineSnapshot>>,
    cache: ResultCache,
    nlp: Box<dyn QueryProcessor + Send + Sync>,
    params: Bm25Params,
}

impl SearchEngine {
    pub fn new(
        corpus: Vec<Command>,
        params: Bm25Params,
        embedding: Option<EmbeddingIndex>,
        nlp: Box<dyn QueryProcessor + Send + Sync>,
        cache_capacity: usize,
        cache_ttl: Duration,
    ) -> Self {
        let snapshot = EngineSnapshot::build(corpus, params, embedding);
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            cache: ResultCache::new(cache_capacity, cache_ttl),
            nlp,
            params,
        }
    }

    fn current_snapshot(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&self.snapshot.read().expect("engine snapshot lock poisoned"))
    }

    /// `Search(query, options) -> [SearchResult]` (spec §6). Lazily
    /// rebuilds if the held snapshot's document count has drifted from
    /// what was last built over (spec §4.2 rebuild semantics) — in this
    /// engine the snapshot and corpus are swapped together, so this is a
    /// defensive no-op unless a caller mutates the corpus out of band.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let snapshot = self.current_snapshot();
        let pipeline_snapshot = Snapshot {
            corpus: &snapshot.corpus,
            index: &snapshot.index,
            tfidf: snapshot.tfidf.as_ref(),
            embedding: snapshot.embedding.as_ref(),
            nlp: self.nlp.as_ref(),
        };
        pipeline::search(&pipeline_snapshot, Some(&self.cache), query, options)
    }

    /// Rebuild over a freshly supplied corpus (e.g. after a personal-corpus
    /// merge). Constructs the new snapshot off to the side, then swaps the
    /// shared pointer and invalidates the cache; queries already in flight
    /// keep running against the snapshot they captured.
    pub fn rebuild(&self, corpus: Vec<Command>, embedding: Option<EmbeddingIndex>) {
        let new_snapshot = Arc::new(EngineSnapshot::build(corpus, self.params, embedding));
        {
            let mut guard = self.snapshot.write().expect("engine snapshot lock poisoned");
            *guard = new_snapshot;
        }
        self.invalidate();
    }

    pub fn invalidate(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cleanup_expired_cache(&self) -> usize {
        self.cache.cleanup_expired()
    }

    pub fn corpus_len(&self) -> usize {
        self.current_snapshot().corpus.len()
    }

    /// The `command` string for a given docID, for display purposes — the
    /// engine, not `SearchResult`, is the thing with corpus access (spec
    /// §9: results carry a docID, never a pointer into the corpus).
    pub fn command_text(&self, doc_id: usize) -> Option<String> {
        self.current_snapshot()
            .corpus
            .get(doc_id)
            .map(|c| c.command.clone())
    }

    pub fn description_text(&self, doc_id: usize) -> Option<String> {
        self.current_snapshot()
            .corpus
            .get(doc_id)
            .map(|c| c.description.clone())
    }

    #[cfg(test)]
    fn cache_key_for(&self, query: &str, options: &SearchOptions) -> CacheKey {
        crate::cache::fingerprint(&crate::cache::normalize_query(query), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::DefaultNlp;

    fn make_command(command: &str, description: &str) -> Command {
        let mut c = Command {
            command: command.to_string(),
            description: description.to_string(),
            keywords: vec![],
            tags: vec![],
            platform: vec![],
            pipeline: false,
            niche: None,
            command_lower: String::new(),
            description_lower: String::new(),
            keywords_lower: String::new(),
            tags_lower: String::new(),
        };
        c.finalize();
        c
    }

    fn engine() -> SearchEngine {
        let corpus = vec![
            make_command("git commit -m 'message'", "commit changes"),
            make_command("find . -name '*.txt'", "find text files"),
        ];
        SearchEngine::new(
            corpus,
            Bm25Params::default(),
            None,
            Box::new(DefaultNlp),
            100,
            Duration::from_secs(300),
        )
    }

    #[test]
    fn search_returns_results_and_populates_cache() {
        let engine = engine();
        let options = SearchOptions {
            use_nlp: false,
            ..Default::default()
        };
        let results = engine.search("git commit", &options);
        assert!(!results.is_empty());
        let key = engine.cache_key_for("git commit", &options);
        assert!(engine.cache.get(&key).is_some());
    }

    #[test]
    fn rebuild_invalidates_cache() {
        let engine = engine();
        let options = SearchOptions {
            use_nlp: false,
            ..Default::default()
        };
        engine.search("git commit", &options);
        assert!(engine.stats().size > 0 || engine.stats().hits + engine.stats().misses > 0);

        engine.rebuild(vec![make_command("new cmd", "new description")], None);
        assert_eq!(engine.stats().size, 0);
        assert_eq!(engine.corpus_len(), 1);
    }

    #[test]
    fn invalidate_clears_cache_without_rebuilding() {
        let engine = engine();
        let options = SearchOptions {
            use_nlp: false,
            ..Default::default()
        };
        engine.search("git commit", &options);
        engine.invalidate();
        assert_eq!(engine.stats().size, 0);
        assert_eq!(engine.corpus_len(), 2);
    }
}
