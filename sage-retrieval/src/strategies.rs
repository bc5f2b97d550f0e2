//! Retrieval strategies: semantic, keyword, and weighted hybrid fusion,
//! selected adaptively from the query's complexity class.

use crate::cache::EmbeddingCache;
use crate::classifier::QueryComplexity;
use crate::query::terms;
use sage_core::config::FusionConfig;
use sage_core::error::{Result, SageError};
use sage_core::traits::{EmbeddingProvider, ScoredPoint, VectorIndex};
use sage_core::types::{ChunkMetadata, Vector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Which strategy produced a retrieved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Semantic,
    Keyword,
    Hybrid,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::Hybrid => "hybrid",
        }
    }
}

/// A candidate document scored for one query. Created fresh per query,
/// never persisted.
///
/// `combined_score` is derived from the two signal scores by the fusion and
/// rerank code in this crate; nothing takes it from external input.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub similarity_score: f32,
    pub keyword_score: f32,
    pub combined_score: f32,
    pub strategy: StrategyKind,
}

impl RetrievedDocument {
    fn from_point(point: ScoredPoint, strategy: StrategyKind) -> Self {
        let similarity = 1.0 - point.distance;
        Self {
            content: point.content,
            metadata: point.metadata,
            similarity_score: similarity,
            keyword_score: 0.0,
            combined_score: similarity,
            strategy,
        }
    }
}

/// Fraction of query terms present in the document, in [0, 1].
pub fn keyword_score(query_terms: &HashSet<String>, content: &str) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let doc_terms = terms(content);
    let matches = query_terms.iter().filter(|t| doc_terms.contains(*t)).count();
    matches as f32 / query_terms.len() as f32
}

/// Weighted fusion of the two signals. Monotone in both inputs for fixed α.
pub fn fuse(similarity: f32, keyword: f32, alpha: f32) -> f32 {
    alpha * similarity + (1.0 - alpha) * keyword
}

/// Runs the adaptively-selected strategy against the external collaborators.
///
/// Both external calls are bounded by `deadline`; past it the query fails
/// closed instead of hanging.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    fusion: FusionConfig,
    deadline: Duration,
    embedding_cache: Option<EmbeddingCache>,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        fusion: FusionConfig,
        deadline: Duration,
        embedding_cache: Option<EmbeddingCache>,
    ) -> Self {
        Self {
            embedder,
            index,
            fusion,
            deadline,
            embedding_cache,
        }
    }

    /// Retrieve candidates for `query` using the strategy its complexity
    /// selects: Simple → semantic only, narrow; Medium/Complex → hybrid,
    /// wider, with the keyword signal weighted higher for complex queries.
    pub async fn retrieve(
        &self,
        query: &str,
        complexity: QueryComplexity,
    ) -> Result<(Vec<RetrievedDocument>, StrategyKind)> {
        match complexity {
            QueryComplexity::Simple => {
                let docs = self.semantic(query, self.fusion.simple_top_k).await?;
                Ok((docs, StrategyKind::Semantic))
            }
            QueryComplexity::Medium => {
                let docs = self
                    .hybrid(query, self.fusion.medium_top_k, self.fusion.alpha_medium)
                    .await?;
                Ok((docs, StrategyKind::Hybrid))
            }
            QueryComplexity::Complex => {
                let docs = self
                    .hybrid(query, self.fusion.complex_top_k, self.fusion.alpha_complex)
                    .await?;
                Ok((docs, StrategyKind::Hybrid))
            }
        }
    }

    /// Vector-only retrieval of the top `top_k` neighbors.
    async fn semantic(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let vector = self.embed_query(query).await?;
        let points = self
            .with_deadline("vector index query", self.index.query(&vector, top_k))
            .await?;

        Ok(points
            .into_iter()
            .map(|p| RetrievedDocument::from_point(p, StrategyKind::Semantic))
            .collect())
    }

    /// Semantic over-fetch of 2×`top_k`, keyword overlay, weighted fusion,
    /// re-sort, truncate.
    async fn hybrid(
        &self,
        query: &str,
        top_k: usize,
        alpha: f32,
    ) -> Result<Vec<RetrievedDocument>> {
        let vector = self.embed_query(query).await?;
        let points = self
            .with_deadline("vector index query", self.index.query(&vector, top_k * 2))
            .await?;

        let query_terms = terms(query);
        let mut docs: Vec<RetrievedDocument> = points
            .into_iter()
            .map(|p| {
                let mut doc = RetrievedDocument::from_point(p, StrategyKind::Hybrid);
                doc.keyword_score = keyword_score(&query_terms, &doc.content);
                doc.combined_score = fuse(doc.similarity_score, doc.keyword_score, alpha);
                doc
            })
            .collect();

        docs.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        docs.truncate(top_k);

        debug!(candidates = docs.len(), alpha, "hybrid fusion complete");
        Ok(docs)
    }

    async fn embed_query(&self, query: &str) -> Result<Vector> {
        if let Some(cache) = &self.embedding_cache {
            let key = crate::cache::EmbeddingCacheKey::new(
                query.to_string(),
                self.embedder.model_name().to_string(),
            );
            if let Some(cached) = cache.get(&key).await {
                debug!("embedding cache hit");
                return Ok((*cached).clone());
            }
            let vector = self
                .with_deadline("embedding", self.embedder.embed(query))
                .await?;
            cache.insert(key, vector.clone()).await;
            return Ok(vector);
        }

        self.with_deadline("embedding", self.embedder.embed(query))
            .await
    }

    async fn with_deadline<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(SageError::timeout(format!(
                "{} exceeded {:?}",
                what, self.deadline
            ))),
        }
    }
}
