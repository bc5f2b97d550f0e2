//! In-process collaborators for tests, demos, and offline evaluation.
//!
//! `MockEmbedder` produces deterministic bag-of-words embeddings: texts that
//! share terms land near each other under cosine similarity, which is enough
//! to exercise the retrieval pipeline without a real model. It does NOT
//! provide semantic understanding.

use crate::error::{Result, SageError};
use crate::traits::{EmbeddingProvider, IndexEntry, ScoredPoint, VectorIndex};
use crate::types::{cosine_similarity, normalize, Vector};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Deterministic embedding provider for testing.
pub struct MockEmbedder {
    model_name: String,
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: "mock-bow".to_string(),
            dimension,
        }
    }

    fn term_bucket(&self, term: &str) -> usize {
        let hash = term
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        (hash % self.dimension as u64) as usize
    }

    fn generate_embedding(&self, text: &str) -> Vector {
        let mut embedding = vec![0.0; self.dimension];

        for word in text.split_whitespace() {
            let term: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if term.is_empty() {
                continue;
            }
            embedding[self.term_bucket(&term)] += 1.0;
        }

        normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.generate_embedding(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|t| self.generate_embedding(t)).collect())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Brute-force cosine index held in memory.
///
/// Batches are appended under a single write lock, so a concurrent query
/// sees either none or all of a document's chunks.
pub struct InMemoryVectorIndex {
    dimension: usize,
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<()> {
        for entry in &entries {
            if entry.vector.len() != self.dimension {
                return Err(SageError::DimensionMismatch {
                    expected: self.dimension,
                    got: entry.vector.len(),
                });
            }
        }
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredPoint>> {
        if vector.len() != self.dimension {
            return Err(SageError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }

        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredPoint> = entries
            .iter()
            .map(|entry| ScoredPoint {
                content: entry.content.clone(),
                metadata: entry.metadata.clone(),
                distance: 1.0 - cosine_similarity(&entry.vector, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    #[tokio::test]
    async fn test_mock_embedder_deterministic() {
        let provider = MockEmbedder::new(128);
        assert_eq!(provider.dimension(), 128);

        let a = provider.embed("cash secured put").await.unwrap();
        let b = provider.embed("cash secured put").await.unwrap();
        assert_eq!(a, b);

        let c = provider.embed("wheel strategy").await.unwrap();
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_mock_embedder_term_overlap_drives_similarity() {
        let provider = MockEmbedder::new(256);

        let query = provider.embed("what is a csp").await.unwrap();
        let near = provider
            .embed("a csp is a cash secured put")
            .await
            .unwrap();
        let far = provider
            .embed("momentum scanners flag unusual volume")
            .await
            .unwrap();

        assert!(cosine_similarity(&query, &near) > cosine_similarity(&query, &far));
    }

    #[tokio::test]
    async fn test_in_memory_index_orders_by_distance() {
        let provider = MockEmbedder::new(256);
        let index = InMemoryVectorIndex::new(256);

        let texts = ["the quick brown fox", "quick brown dogs", "options greeks"];
        for (i, text) in texts.iter().enumerate() {
            let vector = provider.embed(text).await.unwrap();
            index
                .add(vec![IndexEntry {
                    id: format!("doc-{}", i),
                    vector,
                    content: text.to_string(),
                    metadata: ChunkMetadata::default(),
                }])
                .await
                .unwrap();
        }
        assert_eq!(index.count().await.unwrap(), 3);

        let query = provider.embed("quick brown fox").await.unwrap();
        let hits = index.query(&query, 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "the quick brown fox");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_in_memory_index_dimension_mismatch() {
        let index = InMemoryVectorIndex::new(8);
        let err = index.query(&[0.0; 4], 1).await.unwrap_err();
        assert!(matches!(
            err,
            SageError::DimensionMismatch {
                expected: 8,
                got: 4
            }
        ));
    }
}
