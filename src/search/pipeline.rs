//! The query pipeline orchestrator (spec §4.3): tokenize → NLP-enhance →
//! select-top-terms → score → collect → rerank → boost → semantic-blend →
//! sort → limit.
//!
//! Grounded on `search/result_ranking.rs`'s role as the "wire several
//! ranking signals into one ordered result list" orchestrator, generalized
//! from a single BM25+reranker composition into the full chain spec §4.3
//! describes.

use crate::cache::{fingerprint, normalize_query, ResultCache};
use crate::index::{EmbeddingIndex, InvertedIndex, TfIdfModel};
use crate::models::{Command, ProcessedQuery, SearchOptions, SearchResult};
use crate::nlp::QueryProcessor;
use crate::search::cascading;
use crate::search::filters;
use crate::search::fuzzy;
use crate::search::intent_boost;
use ahash::AHashMap;
use rayon::prelude::*;
use std::collections::HashMap;

const MAX_TOTAL_TERMS: usize = 8;
const TFIDF_ALPHA: f64 = 0.35;

/// Bundles the read-only, shared-after-build structures a query needs.
/// Mirrors spec §5's "built once, then immutable and freely shared across
/// reader threads without locks" shared-resource policy.
pub struct Snapshot<'a> {
    pub corpus: &'a [Command],
    pub index: &'a InvertedIndex,
    pub tfidf: Option<&'a TfIdfModel>,
    pub embedding: Option<&'a EmbeddingIndex>,
    pub nlp: &'a dyn QueryProcessor,
}

/// Run one query against `snapshot`, optionally consulting/populating
/// `cache`. This is the `Search(query, options) -> [SearchResult]` entry
/// point from spec §6.
pub fn search(
    snapshot: &Snapshot,
    cache: Option<&ResultCache>,
    query: &str,
    options: &SearchOptions,
) -> Vec<SearchResult> {
    let normalized = normalize_query(query);
    let key = fingerprint(&normalized, options);

    if let Some(cache) = cache {
        if let Some(cached) = cache.get(&key) {
            return cached;
        }
    }

    let results = search_uncached(snapshot, query, options);

    if let Some(cache) = cache {
        cache.put(key, results.clone());
    }

    results
}

fn search_uncached(snapshot: &Snapshot, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
    // Step 1 — tokenize.
    let mut terms: Vec<String> = crate::tokenizer::tokenize(query);

    // Step 2 — NLP enhancement, capped at 8 total terms.
    let processed = if options.use_nlp {
        let processed = snapshot.nlp.process(query);
        for kw in &processed.enhanced_keywords {
            if terms.len() >= MAX_TOTAL_TERMS {
                break;
            }
            if !terms.contains(kw) {
                terms.push(kw.clone());
            }
        }
        processed
    } else {
        ProcessedQuery::default()
    };

    // Step 3 — fuzzy fallback if term list is empty.
    if terms.is_empty() {
        return if options.use_fuzzy {
            fuzzy::fuzzy_search(
                snapshot.corpus,
                query,
                options.effective_limit(),
                options.fuzzy_threshold,
            )
        } else {
            Vec::new()
        };
    }

    // Step 4 — top-term selection.
    let selected_terms = select_top_terms(snapshot.index, &terms, options.top_terms_cap);

    // Step 5 — term boosts.
    let boosts = compute_term_boosts(options, &processed);

    // Step 6 — BM25F accumulation with filters.
    let current_platform = filters::current_platform();
    let mut scores: HashMap<usize, f64> = accumulate_scores(
        snapshot,
        &selected_terms,
        &boosts,
        options,
        current_platform,
    );

    // Step 7 — fallback to fuzzy if no hits.
    if scores.is_empty() {
        return if options.use_fuzzy {
            fuzzy::fuzzy_search(
                snapshot.corpus,
                query,
                options.effective_limit(),
                options.fuzzy_threshold,
            )
        } else {
            Vec::new()
        };
    }

    // Step 8 — collect & local boosts.
    apply_local_boosts(snapshot, &mut scores, &processed, options);

    // Step 9 — preliminary sort.
    let mut results: Vec<SearchResult> = scores
        .into_iter()
        .map(|(doc_id, score)| SearchResult { doc_id, score })
        .collect();
    sort_desc(&mut results);

    // Step 10 — post-scoring boosts.
    if options.use_nlp {
        if let Some(tfidf) = snapshot.tfidf {
            apply_tfidf_rerank(tfidf, &selected_terms, options, &mut results);
        }
        if !processed.is_empty() {
            apply_cascading_boost(snapshot, &processed, &mut results);
        }
    }
    if let Some(embedding) = snapshot.embedding {
        apply_semantic_blend(embedding, &selected_terms, &mut results);
    }

    // Step 11 — truncate.
    results.truncate(options.effective_limit());
    results
}

fn sort_desc(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.doc_id.cmp(&b.doc_id))
    });
}

/// Spec §4.3 step 4: keep the first `min(4, len)` terms unconditionally
/// ("original"), fill the rest by descending IDF until `cap` is reached.
fn select_top_terms(index: &InvertedIndex, terms: &[String], cap: usize) -> Vec<String> {
    let cap = if cap == 0 { terms.len() } else { cap };
    if terms.len() <= cap {
        return terms.to_vec();
    }

    let original_count = 4.min(terms.len());
    let (original, enhanced) = terms.split_at(original_count);

    let mut ranked_enhanced: Vec<&String> = enhanced.iter().collect();
    ranked_enhanced.sort_by(|a, b| {
        index
            .idf(b)
            .partial_cmp(&index.idf(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let remaining_slots = cap.saturating_sub(original_count);
    let mut selected: Vec<String> = original.to_vec();
    selected.extend(ranked_enhanced.into_iter().take(remaining_slots).cloned());
    selected
}

/// Spec §4.3 step 5: raise (never lower) boosts for detected actions/targets.
fn compute_term_boosts(options: &SearchOptions, processed: &ProcessedQuery) -> HashMap<String, f64> {
    let mut boosts = options.context_boosts.clone();
    for action in &processed.actions {
        let entry = boosts.entry(action.clone()).or_insert(1.0);
        if *entry < 2.0 {
            *entry = 2.0;
        }
    }
    for target in &processed.targets {
        let entry = boosts.entry(target.clone()).or_insert(1.0);
        if *entry < 1.6 {
            *entry = 1.6;
        }
    }
    boosts
}

/// Spec §4.3 step 6: BM25F accumulation with per-term boost and filters,
/// computed once into a map before the loop (spec §9: avoids the "double
/// application" bug by construction rather than by careful ordering).
fn accumulate_scores(
    snapshot: &Snapshot,
    terms: &[String],
    boosts: &HashMap<String, f64>,
    options: &SearchOptions,
    current_platform: &str,
) -> HashMap<usize, f64> {
    let index = snapshot.index;
    let per_term: Vec<AHashMap<usize, f64>> = terms
        .par_iter()
        .map(|term| {
            let idf = index.idf(term);
            if idf < index.params.min_idf {
                return AHashMap::new();
            }
            let beta = *boosts.get(term).unwrap_or(&1.0);
            let mut local: AHashMap<usize, f64> = AHashMap::new();
            for posting in index.postings_for(term) {
                let cmd = &snapshot.corpus[posting.doc_id];
                if options.pipeline_only && !filters::is_pipeline(cmd) {
                    continue;
                }
                if !filters::platform_allowed(cmd, current_platform, options.all_platforms) {
                    continue;
                }
                let contribution = idf * beta * index.field_bm25_sum(posting);
                *local.entry(posting.doc_id).or_insert(0.0) += contribution;
            }
            local
        })
        .collect();

    let mut scores: HashMap<usize, f64> = HashMap::new();
    for local in per_term {
        for (doc_id, contribution) in local {
            *scores.entry(doc_id).or_insert(0.0) += contribution;
        }
    }
    scores
}

/// Spec §4.3 step 8: intent boost, co-occurrence, pipeline boost.
fn apply_local_boosts(
    snapshot: &Snapshot,
    scores: &mut HashMap<usize, f64>,
    processed: &ProcessedQuery,
    options: &SearchOptions,
) {
    for (doc_id, score) in scores.iter_mut() {
        let cmd = &snapshot.corpus[*doc_id];

        let intent_multiplier = intent_boost::intent_boost(cmd, processed);
        *score *= intent_multiplier;

        if options.use_nlp && !processed.actions.is_empty() && !processed.targets.is_empty() {
            let haystack = cmd.haystack_lower();
            let has_action = processed.actions.iter().any(|a| haystack.contains(a.as_str()));
            let has_target = processed.targets.iter().any(|t| haystack.contains(t.as_str()));
            if has_action && has_target {
                *score *= 1.2;
            }
        }

        if options.pipeline_boost > 0.0 && filters::is_pipeline(cmd) {
            *score *= options.pipeline_boost;
        }
    }
}

/// Spec §4.6 TF-IDF rerank.
fn apply_tfidf_rerank(
    tfidf: &TfIdfModel,
    terms: &[String],
    options: &SearchOptions,
    results: &mut Vec<SearchResult>,
) {
    let top_k = (options.effective_limit() * 5).max(10);
    let candidates = top_k.min(results.len());
    let candidate_ids: std::collections::HashSet<usize> =
        results[..candidates].iter().map(|r| r.doc_id).collect();

    let tfidf_hits = tfidf.search(terms, top_k);
    let tfidf_by_doc: HashMap<usize, f32> = tfidf_hits.into_iter().collect();

    for result in results.iter_mut() {
        if !candidate_ids.contains(&result.doc_id) {
            continue;
        }
        if let Some(similarity) = tfidf_by_doc.get(&result.doc_id) {
            result.score += TFIDF_ALPHA * (*similarity as f64) * 100.0;
        }
    }
    sort_desc(results);
}

/// Spec §4.8 cascading boost.
fn apply_cascading_boost(snapshot: &Snapshot, processed: &ProcessedQuery, results: &mut [SearchResult]) {
    for result in results.iter_mut() {
        let cmd = &snapshot.corpus[result.doc_id];
        result.score *= cascading::cascading_multiplier(cmd, processed);
    }
    sort_desc(results);
}

/// Spec §4.9 semantic blend.
fn apply_semantic_blend(embedding: &EmbeddingIndex, terms: &[String], results: &mut [SearchResult]) {
    if !embedding.is_loaded() {
        return;
    }
    let Some(query_vec) = embedding.embed_query(terms) else {
        return;
    };
    for result in results.iter_mut() {
        if let Some(similarity) = embedding.similarity(&query_vec, result.doc_id) {
            result.score *= EmbeddingIndex::blend_multiplier(similarity);
        }
    }
    sort_desc(results);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Bm25Params;
    use crate::nlp::DefaultNlp;

    fn make_command(command: &str, description: &str, keywords: &[&str], pipeline: bool) -> Command {
        let mut c = Command {
            command: command.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            tags: vec![],
            platform: vec![],
            pipeline,
            niche: None,
            command_lower: String::new(),
            description_lower: String::new(),
            keywords_lower: String::new(),
            tags_lower: String::new(),
        };
        c.finalize();
        c
    }

    fn scenario_corpus() -> Vec<Command> {
        vec![
            make_command(
                "git commit -m 'message'",
                "commit changes with message",
                &["git", "commit", "message"],
                false,
            ),
            make_command(
                "find . -name '*.txt'",
                "find text files",
                &["find", "files", "text"],
                false,
            ),
            make_command(
                "tar -czf archive.tar.gz .",
                "create compressed archive",
                &["tar", "compress", "archive"],
                false,
            ),
        ]
    }

    #[test]
    fn scenario_1_git_commit_ranks_first_with_positive_score() {
        let corpus = scenario_corpus();
        let index = InvertedIndex::build(&corpus, Bm25Params::default());
        let nlp = DefaultNlp;
        let snapshot = Snapshot {
            corpus: &corpus,
            index: &index,
            tfidf: None,
            embedding: None,
            nlp: &nlp,
        };
        let options = SearchOptions {
            limit: 5,
            use_nlp: false,
            ..Default::default()
        };
        let results = search(&snapshot, None, "git commit", &options);
        assert!(!results.is_empty());
        assert_eq!(results[0].doc_id, 0);
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn scenario_2_nonexistent_query_with_fuzzy_off_is_empty() {
        let corpus = scenario_corpus();
        let index = InvertedIndex::build(&corpus, Bm25Params::default());
        let nlp = DefaultNlp;
        let snapshot = Snapshot {
            corpus: &corpus,
            index: &index,
            tfidf: None,
            embedding: None,
            nlp: &nlp,
        };
        let options = SearchOptions {
            use_fuzzy: false,
            use_nlp: false,
            ..Default::default()
        };
        let results = search(&snapshot, None, "nonexistent", &options);
        assert!(results.is_empty());
    }

    #[test]
    fn scenario_3_limit_is_honored_with_ties() {
        let corpus = vec![
            make_command("cmd-a", "test", &[], false),
            make_command("cmd-b", "test", &[], false),
            make_command("cmd-c", "test", &[], false),
        ];
        let index = InvertedIndex::build(&corpus, Bm25Params::default());
        let nlp = DefaultNlp;
        let snapshot = Snapshot {
            corpus: &corpus,
            index: &index,
            tfidf: None,
            embedding: None,
            nlp: &nlp,
        };
        let options = SearchOptions {
            limit: 2,
            use_nlp: false,
            ..Default::default()
        };
        let results = search(&snapshot, None, "test", &options);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn scenario_4_pipeline_boost_ranks_pipeline_above_non_pipeline() {
        let corpus = vec![
            make_command("cat file.txt | grep test | head -5", "pipeline form", &[], true),
            make_command("grep test file.txt", "plain form", &[], false),
        ];
        let index = InvertedIndex::build(&corpus, Bm25Params::default());
        let nlp = DefaultNlp;
        let snapshot = Snapshot {
            corpus: &corpus,
            index: &index,
            tfidf: None,
            embedding: None,
            nlp: &nlp,
        };
        let options = SearchOptions {
            pipeline_boost: 2.0,
            use_nlp: false,
            ..Default::default()
        };
        let results = search(&snapshot, None, "grep test", &options);
        assert!(results.len() >= 2);
        assert_eq!(results[0].doc_id, 0);
    }

    #[test]
    fn scenario_5_cache_hit_is_consistent_and_counted() {
        let corpus = scenario_corpus();
        let index = InvertedIndex::build(&corpus, Bm25Params::default());
        let nlp = DefaultNlp;
        let snapshot = Snapshot {
            corpus: &corpus,
            index: &index,
            tfidf: None,
            embedding: None,
            nlp: &nlp,
        };
        let cache = ResultCache::new(100, std::time::Duration::from_secs(300));
        let options = SearchOptions {
            limit: 10,
            use_nlp: false,
            ..Default::default()
        };
        let first = search(&snapshot, Some(&cache), "git commit", &options);
        let second = search(&snapshot, Some(&cache), "git commit", &options);
        assert_eq!(first, second);
        assert!(cache.stats().hits >= 1);
    }

    #[test]
    fn doubling_context_boosts_never_decreases_score() {
        let corpus = scenario_corpus();
        let index = InvertedIndex::build(&corpus, Bm25Params::default());
        let nlp = DefaultNlp;
        let snapshot = Snapshot {
            corpus: &corpus,
            index: &index,
            tfidf: None,
            embedding: None,
            nlp: &nlp,
        };
        let mut boosts = HashMap::new();
        boosts.insert("commit".to_string(), 1.0);
        let base_options = SearchOptions {
            use_nlp: false,
            context_boosts: boosts.clone(),
            ..Default::default()
        };
        let base_results = search(&snapshot, None, "git commit", &base_options);

        for v in boosts.values_mut() {
            *v *= 2.0;
        }
        let doubled_options = SearchOptions {
            use_nlp: false,
            context_boosts: boosts,
            ..Default::default()
        };
        let doubled_results = search(&snapshot, None, "git commit", &doubled_options);

        let base_score = base_results.iter().find(|r| r.doc_id == 0).map(|r| r.score).unwrap_or(0.0);
        let doubled_score = doubled_results.iter().find(|r| r.doc_id == 0).map(|r| r.score).unwrap_or(0.0);
        assert!(doubled_score >= base_score);
    }
}
