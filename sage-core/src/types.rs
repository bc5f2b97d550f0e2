//! Core types shared by the indexer and the query engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A vector embedding.
pub type Vector = Vec<f32>;

/// Chunk identifier. Deterministic: derived from the document hash and the
/// chunk position, so re-indexing an unchanged document is byte-stable.
pub type ChunkId = String;

/// Typed metadata attached to every chunk.
///
/// Named fields cover what the engine itself reads (title boosts, category
/// facets, reading-time display); `extra` is the open extension map for
/// ad hoc keys carried through from callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub title: Option<String>,
    pub category: Option<String>,
    /// Original source path of the document
    pub source: Option<String>,
    pub word_count: Option<usize>,
    pub reading_time_minutes: Option<u64>,
    pub indexed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A chunk of a source document, the unit of embedding and retrieval.
///
/// Owned by the indexer until handed to the vector index; immutable once
/// created. `doc_hash` is the content hash of the whole source document and
/// drives whole-document deduplication. Invariant: `chunk_index <
/// total_chunks`, and all chunks sharing a `doc_hash` share `total_chunks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub chunk_id: ChunkId,
    pub doc_hash: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let dot = dot_product(a, b);
    let norm_a = (a.iter().map(|x| x * x).sum::<f32>()).sqrt();
    let norm_b = (b.iter().map(|x| x * x).sum::<f32>()).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Calculate dot product of two vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Normalize a vector to unit length in place.
pub fn normalize(v: &mut [f32]) {
    let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}
