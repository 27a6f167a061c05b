//! The three ranking signals the search pipeline composes: the BM25F
//! inverted index, the TF-IDF reranker, and the semantic embedding blend.

pub mod embedding;
pub mod inverted;
pub mod tfidf;

pub use embedding::EmbeddingIndex;
pub use inverted::{Bm25Params, InvertedIndex};
pub use tfidf::TfIdfModel;
