//! Semantic blend signal (spec §4.9): mean word-vector query embedding vs.
//! precomputed per-command dense embeddings, blended via cosine similarity.
//!
//! Grounded on the teacher's `simd_ranking.rs`/`simd_test.rs` use of
//! `simsimd::SpatialSimilarity::dot`/`cosine` directly on dense `f32`
//! slices — embeddings here are naturally dense, so this module takes the
//! dense path the teacher's SIMD tests exercise rather than the sparse
//! intersection path `simd_ranking.rs`'s `SparseVector` uses.

use ahash::AHashMap;
use simsimd::SpatialSimilarity;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const EMBEDDING_DIM: usize = 100;
/// Below this cosine similarity the semantic signal is considered noise and
/// contributes nothing (spec §4.9).
pub const SEMANTIC_MIN: f64 = 0.2;
/// Blend strength: `multiplier = 1 + ALPHA_SEM * similarity`.
pub const ALPHA_SEM: f64 = 0.3;

const WORD_VECTORS_FILE: &str = "word_vectors.bin";
const COMMAND_EMBEDDINGS_FILE: &str = "command_embeddings.bin";

/// Spec §6 filename search path: working directory, `./assets/`, the
/// executable's own directory, `$EXEDIR/assets/`. Absence at every
/// location is not an error — it just means "no semantic blend".
pub fn discover_embedding_paths() -> Option<(PathBuf, PathBuf)> {
    let mut search_dirs: Vec<PathBuf> = vec![PathBuf::from("."), PathBuf::from("./assets")];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            search_dirs.push(exe_dir.to_path_buf());
            search_dirs.push(exe_dir.join("assets"));
        }
    }

    search_dirs.into_iter().find_map(|dir| {
        let words = dir.join(WORD_VECTORS_FILE);
        let commands = dir.join(COMMAND_EMBEDDINGS_FILE);
        if words.is_file() && commands.is_file() {
            Some((words, commands))
        } else {
            None
        }
    })
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("truncated embedding file: {0}")]
    Truncated(&'static str),
}

/// Word vectors plus precomputed per-command embeddings. Absence of either
/// asset is not an error at the call site — `load` returns a `Result` but
/// callers that find no file at all should treat it as "semantic blending
/// disabled" rather than propagate a hard failure (spec §9 Open Question).
pub struct EmbeddingIndex {
    word_vectors: AHashMap<String, Vec<f32>>,
    command_embeddings: Vec<Vec<f32>>,
}

impl EmbeddingIndex {
    /// Load word vectors from `word_vectors_path` and command embeddings
    /// from `command_embeddings_path`. If the command-embedding file's
    /// `num_commands` disagrees with `expected_commands`, the mismatch is
    /// logged and the embeddings are discarded rather than treated as fatal.
    pub fn load(
        word_vectors_path: &Path,
        command_embeddings_path: &Path,
        expected_commands: usize,
    ) -> Result<Self, EmbeddingError> {
        let word_vectors = load_word_vectors(word_vectors_path)?;
        let command_embeddings =
            load_command_embeddings(command_embeddings_path, expected_commands)?;
        Ok(Self {
            word_vectors,
            command_embeddings,
        })
    }

    pub fn empty() -> Self {
        Self {
            word_vectors: AHashMap::new(),
            command_embeddings: Vec::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.command_embeddings.is_empty()
    }

    /// Mean of the known word vectors among `terms`; unknown words are
    /// skipped. `None` if no term is known.
    pub fn embed_query(&self, terms: &[String]) -> Option<Vec<f32>> {
        let mut sum = vec![0.0f32; EMBEDDING_DIM];
        let mut count = 0usize;
        for term in terms {
            if let Some(v) = self.word_vectors.get(term) {
                for (s, x) in sum.iter_mut().zip(v.iter()) {
                    *s += x;
                }
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        for s in sum.iter_mut() {
            *s /= count as f32;
        }
        Some(sum)
    }

    /// Cosine similarity between `query_vec` and command `doc_id`'s
    /// embedding, or `None` if embeddings aren't loaded or `doc_id` is out
    /// of range.
    pub fn similarity(&self, query_vec: &[f32], doc_id: usize) -> Option<f64> {
        let doc_vec = self.command_embeddings.get(doc_id)?;
        f32::cosine(query_vec, doc_vec).map(|c| c as f64)
    }

    /// The §4.9 blend multiplier for a given similarity, or `1.0` (no-op)
    /// if below `SEMANTIC_MIN`.
    pub fn blend_multiplier(similarity: f64) -> f64 {
        if similarity < SEMANTIC_MIN {
            1.0
        } else {
            1.0 + ALPHA_SEM * similarity
        }
    }
}

fn load_word_vectors(path: &Path) -> Result<AHashMap<String, Vec<f32>>, EmbeddingError> {
    let bytes = std::fs::read(path).map_err(|e| EmbeddingError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut cursor = &bytes[..];
    let count = read_u32(&mut cursor)? as usize;
    let mut map = AHashMap::with_capacity(count);
    for _ in 0..count {
        let len = read_u16(&mut cursor)? as usize;
        if cursor.len() < len {
            return Err(EmbeddingError::Truncated("word"));
        }
        let word = String::from_utf8_lossy(&cursor[..len]).into_owned();
        cursor = &cursor[len..];
        let mut vec = Vec::with_capacity(EMBEDDING_DIM);
        for _ in 0..EMBEDDING_DIM {
            vec.push(read_f32(&mut cursor)?);
        }
        map.insert(word, vec);
    }
    Ok(map)
}

fn load_command_embeddings(
    path: &Path,
    expected_commands: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let bytes = std::fs::read(path).map_err(|e| EmbeddingError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut cursor = &bytes[..];
    let num_commands = read_u32(&mut cursor)? as usize;
    let dim = read_u32(&mut cursor)? as usize;
    if num_commands != expected_commands || dim != EMBEDDING_DIM {
        tracing::warn!(
            num_commands,
            expected_commands,
            dim,
            expected_dim = EMBEDDING_DIM,
            "command embedding file shape mismatch, skipping semantic blend"
        );
        return Ok(Vec::new());
    }
    let mut embeddings = Vec::with_capacity(num_commands);
    for _ in 0..num_commands {
        let mut vec = Vec::with_capacity(dim);
        for _ in 0..dim {
            vec.push(read_f32(&mut cursor)?);
        }
        embeddings.push(vec);
    }
    Ok(embeddings)
}

fn read_u32(cursor: &mut &[u8]) -> Result<u32, EmbeddingError> {
    if cursor.len() < 4 {
        return Err(EmbeddingError::Truncated("u32"));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&cursor[..4]);
    *cursor = &cursor[4..];
    Ok(u32::from_le_bytes(buf))
}

fn read_u16(cursor: &mut &[u8]) -> Result<u16, EmbeddingError> {
    if cursor.len() < 2 {
        return Err(EmbeddingError::Truncated("u16"));
    }
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&cursor[..2]);
    *cursor = &cursor[2..];
    Ok(u16::from_le_bytes(buf))
}

fn read_f32(cursor: &mut &[u8]) -> Result<f32, EmbeddingError> {
    if cursor.len() < 4 {
        return Err(EmbeddingError::Truncated("f32"));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&cursor[..4]);
    *cursor = &cursor[4..];
    Ok(f32::from_le_bytes(buf))
}
