//! BM25F inverted index (spec §3 data model, §4.2 build/scoring).
//!
//! Grounded on the teacher's `ranking.rs` (`compute_avgdl`, the BM25
//! formula shape, the `ahash`-backed postings maps) generalized from a
//! single-field BM25 to the four-field BM25F spec §4.2 specifies.

use crate::models::{Command, Field, FieldTf, Posting};
use crate::tokenizer;
use ahash::{AHashMap, AHashSet};

/// Tunable BM25F parameters (spec §3 `params`).
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: [f64; 4],
    pub w: [f64; 4],
    pub min_idf: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            // order matches Field::ALL: command, description, keywords, tags
            b: [0.75, 0.75, 0.7, 0.7],
            w: [3.5, 1.0, 2.0, 1.2],
            min_idf: 0.0,
        }
    }
}

/// Per-field document lengths (token counts), one entry per docID.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocLens(pub [u32; 4]);

/// The BM25F inverted index over a corpus's commands. Built once, read-only
/// thereafter — queries lazily trigger a rebuild if `index.n != corpus.len()`.
pub struct InvertedIndex {
    pub postings: AHashMap<String, Vec<Posting>>,
    pub df: AHashMap<String, usize>,
    pub doc_lens: Vec<DocLens>,
    pub avg_len: [f64; 4],
    pub n: usize,
    pub params: Bm25Params,
}

impl InvertedIndex {
    /// Build (or rebuild) the index over `commands`. Idempotent: building
    /// twice over the same corpus yields identical postings/df/avg_len.
    pub fn build(commands: &[Command], params: Bm25Params) -> Self {
        let n = commands.len();
        let mut doc_lens = vec![DocLens::default(); n];
        // term -> per-document FieldTf accumulator, built per doc then merged
        let mut per_doc_tf: Vec<AHashMap<String, FieldTf>> = Vec::with_capacity(n);

        for (doc_id, cmd) in commands.iter().enumerate() {
            let mut tf_map: AHashMap<String, FieldTf> = AHashMap::new();
            for field in Field::ALL {
                let text = cmd.field_lower(field);
                let tokens = tokenizer::tokenize(text);
                doc_lens[doc_id].0[field.index()] = tokens.len() as u32;
                for tok in tokens {
                    tf_map.entry(tok).or_default().add(field, 1);
                }
            }
            per_doc_tf.push(tf_map);
        }

        let mut avg_len = [0.0f64; 4];
        for field in Field::ALL {
            let sum: f64 = doc_lens.iter().map(|dl| dl.0[field.index()] as f64).sum();
            avg_len[field.index()] = if n == 0 { 0.0 } else { sum / n as f64 };
        }

        let mut df: AHashMap<String, usize> = AHashMap::new();
        let mut postings: AHashMap<String, Vec<Posting>> = AHashMap::new();
        for (doc_id, tf_map) in per_doc_tf.into_iter().enumerate() {
            for (term, field_tf) in tf_map {
                *df.entry(term.clone()).or_insert(0) += 1;
                postings.entry(term).or_default().push(Posting {
                    doc_id,
                    field_tf,
                });
            }
        }

        Self {
            postings,
            df,
            doc_lens,
            avg_len,
            n,
            params,
        }
    }

    /// `idf(t) = log((N - df(t) + 0.5) / (df(t) + 0.5) + 1)`, the
    /// Okapi BM25 `+1`-shifted variant that guarantees non-negativity.
    pub fn idf(&self, term: &str) -> f64 {
        let df = *self.df.get(term).unwrap_or(&0) as f64;
        let n = self.n as f64;
        (((n - df + 0.5) / (df + 0.5)) + 1.0).ln()
    }

    /// Sum of per-field BM25 contributions of `term` in document `doc_id`,
    /// given its posting.
    pub fn field_bm25_sum(&self, posting: &Posting) -> f64 {
        let mut total = 0.0;
        let doc_lens = &self.doc_lens[posting.doc_id];
        for field in Field::ALL {
            let tf = posting.field_tf.get(field) as f64;
            if tf <= 0.0 {
                continue;
            }
            let idx = field.index();
            let avg = self.avg_len[idx];
            let norm = if avg == 0.0 {
                1.0
            } else {
                (1.0 - self.params.b[idx]) + self.params.b[idx] * (doc_lens.0[idx] as f64 / avg)
            };
            let weighted = self.params.w[idx] * tf;
            total += weighted * (self.params.k1 + 1.0) / (weighted + self.params.k1 * norm);
        }
        total
    }

    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.postings
            .get(term)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Every distinct term the index knows about — used by top-term
    /// selection and the TF-IDF reranker's vocabulary construction.
    pub fn vocabulary(&self) -> AHashSet<&str> {
        self.postings.keys().map(|s| s.as_str()).collect()
    }
}
