use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cache;
mod cli;
mod config;
mod corpus;
mod engine;
mod index;
mod models;
mod nlp;
mod search;
mod tokenizer;
mod version;

use cli::Args;
use config::RevmanConfig;
use engine::SearchEngine;
use models::SearchOptions;
use nlp::DefaultNlp;

const DEFAULT_CORPUS_PATH: &str = "corpus.yaml";
const DEFAULT_CACHE_CAPACITY: usize = 100;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(RevmanConfig::default_path)
        .unwrap_or_default();
    let config = RevmanConfig::load(&config_path).unwrap_or_default();

    let corpus_path = args
        .corpus
        .clone()
        .unwrap_or_else(|| DEFAULT_CORPUS_PATH.into());
    let personal_glob = args
        .personal_corpus
        .clone()
        .or_else(corpus::default_personal_corpus_glob);
    let commands = match &personal_glob {
        Some(glob_pattern) => corpus::load_with_overrides(&corpus_path, glob_pattern),
        None => corpus::load_corpus_file(&corpus_path),
    }
    .with_context(|| format!("loading corpus from {}", corpus_path.display()))?;

    tracing::debug!(count = commands.len(), path = %corpus_path.display(), "corpus loaded");

    let embedding = index::embedding::discover_embedding_paths().and_then(
        |(word_vectors_path, command_embeddings_path)| {
            match index::EmbeddingIndex::load(&word_vectors_path, &command_embeddings_path, commands.len()) {
                Ok(idx) => Some(idx),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load embedding assets, skipping semantic blend");
                    None
                }
            }
        },
    );

    let cache_capacity = config.cache_capacity().unwrap_or(DEFAULT_CACHE_CAPACITY);
    let cache_ttl = Duration::from_secs(config.cache_ttl_seconds().unwrap_or(DEFAULT_CACHE_TTL_SECS));

    let engine = SearchEngine::new(
        commands,
        index::Bm25Params::default(),
        embedding,
        Box::new(DefaultNlp),
        cache_capacity,
        cache_ttl,
    );

    let options = SearchOptions {
        limit: args.limit.or_else(|| config.search_limit()).unwrap_or(10),
        use_nlp: !args.no_nlp && config.search_use_nlp().unwrap_or(true),
        use_fuzzy: !args.no_fuzzy && config.search_use_fuzzy().unwrap_or(true),
        top_terms_cap: config.search_top_terms_cap().unwrap_or(10),
        pipeline_only: args.pipeline_only,
        pipeline_boost: args.pipeline_boost,
        all_platforms: args.all_platforms || config.search_all_platforms().unwrap_or(false),
        ..Default::default()
    };

    let results = engine.search(&args.query, &options);

    if args.stats {
        let stats = engine.stats();
        println!(
            "hits={} misses={} evictions={} size={} capacity={} hit_ratio={:.2}",
            stats.hits,
            stats.misses,
            stats.evictions,
            stats.size,
            stats.capacity,
            stats.hit_ratio()
        );
        return Ok(());
    }

    if results.is_empty() {
        println!("No matching commands found.");
        return Ok(());
    }

    if args.json {
        let rendered: Vec<_> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "command": engine.command_text(r.doc_id),
                    "description": engine.description_text(r.doc_id),
                    "score": r.score,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        for result in &results {
            let command = engine.command_text(result.doc_id).unwrap_or_default();
            let description = engine.description_text(result.doc_id).unwrap_or_default();
            println!("{:.3}\t{}\n\t{}", result.score, command, description);
        }
    }

    Ok(())
}
