//! Contracts for the two external collaborators: the embedding provider and
//! the vector index. The engine owns neither; the host application constructs
//! them once at startup and injects them.

use crate::error::Result;
use crate::types::{ChunkId, ChunkMetadata, Vector};
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// Implementations are assumed externally thread-safe; the engine does not
/// serialize access to them.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Generate embeddings for multiple texts (batched)
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the fixed output dimension
    fn dimension(&self) -> usize;
}

/// One (id, vector, text, metadata) tuple handed to the vector index.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: ChunkId,
    pub vector: Vector,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// A nearest-neighbor hit returned by the vector index.
///
/// `distance` is cosine distance in [0, 2]; lower is closer.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// Trait for approximate nearest-neighbor stores.
///
/// A document becomes visible to queries only after its chunk-add batch
/// completes; implementations must not expose a partially-added batch.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Add a batch of entries atomically
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// Fetch the `top_k` nearest neighbors of `vector` by cosine distance
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredPoint>>;

    /// Number of stored entries
    async fn count(&self) -> Result<usize>;
}
