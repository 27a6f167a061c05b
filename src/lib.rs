//! # revman_core
//!
//! `revman` is a "reverse man page" retrieval engine: given a
//! natural-language query such as "compress a directory", it returns the
//! most relevant shell commands from a curated corpus, ranked by a hybrid
//! lexical/semantic scorer (BM25F, a TF-IDF reranker, a dense-embedding
//! blend, and a cascading intent/action/target booster).
//!
//! This crate is the retrieval core: tokenization, index build, query
//! pipeline, filters, boosting, and the result cache. Corpus loading, CLI
//! argument parsing, and NLP query-understanding are external
//! collaborators — `corpus`, `cli`, and `nlp` provide one concrete
//! implementation of each, but the pipeline only depends on their output
//! shapes (`Vec<Command>`, `Args`, `ProcessedQuery`).
//!
//! ## Example
//!
//! ```no_run
//! use revman_core::corpus;
//! use revman_core::engine::SearchEngine;
//! use revman_core::index::Bm25Params;
//! use revman_core::models::SearchOptions;
//! use revman_core::nlp::DefaultNlp;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let commands = corpus::load_corpus_file(Path::new("corpus.yaml")).unwrap();
//! let engine = SearchEngine::new(
//!     commands,
//!     Bm25Params::default(),
//!     None,
//!     Box::new(DefaultNlp),
//!     100,
//!     Duration::from_secs(300),
//! );
//!
//! let results = engine.search("compress a directory", &SearchOptions::default());
//! println!("found {} results", results.len());
//! ```

pub mod cache;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod index;
pub mod models;
pub mod nlp;
pub mod search;
pub mod tokenizer;
pub mod version;

pub use engine::SearchEngine;
pub use models::{Command, SearchOptions, SearchResult};
