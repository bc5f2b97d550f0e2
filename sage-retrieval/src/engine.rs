//! The retrieval engine: cache check → classify → adaptive retrieve →
//! rerank → confidence → cache write → metrics.
//!
//! One engine instance owns its cache and metrics; the embedding provider
//! and vector index are injected, so multiple engines (per tenant or per
//! collection) coexist safely and tests run against fakes.

use crate::cache::{EmbeddingCache, QueryCache};
use crate::classifier::{ComplexityClassifier, QueryComplexity};
use crate::confidence::ConfidenceScorer;
use crate::context::format_answer_context;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::rerank::Reranker;
use crate::strategies::{RetrievedDocument, Retriever, StrategyKind};
use sage_core::config::EngineConfig;
use sage_core::error::Result;
use sage_core::traits::{EmbeddingProvider, VectorIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-source attribution carried in a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub title: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub similarity_score: f32,
    pub keyword_score: f32,
    pub combined_score: f32,
    pub strategy: StrategyKind,
}

impl From<&RetrievedDocument> for SourceSummary {
    fn from(doc: &RetrievedDocument) -> Self {
        Self {
            title: doc.metadata.title.clone(),
            category: doc.metadata.category.clone(),
            source: doc.metadata.source.clone(),
            similarity_score: doc.similarity_score,
            keyword_score: doc.keyword_score,
            combined_score: doc.combined_score,
            strategy: doc.strategy,
        }
    }
}

/// Immutable value returned for every query. The engine never errors for
/// "no good answer found"; it answers with an honest confidence instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer_context: String,
    pub sources: Vec<SourceSummary>,
    pub confidence: f32,
    pub retrieval_method: String,
    pub complexity: QueryComplexity,
    pub processing_time_ms: f64,
    pub was_cached: bool,
}

/// Per-call options.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Bypass the query cache entirely when false
    pub use_cache: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Orchestrates the full per-query pipeline.
pub struct RetrievalEngine {
    config: EngineConfig,
    classifier: ComplexityClassifier,
    retriever: Retriever,
    reranker: Reranker,
    scorer: ConfidenceScorer,
    query_cache: Option<QueryCache>,
    metrics: MetricsCollector,
}

impl RetrievalEngine {
    pub fn new(
        config: EngineConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            collection = %config.collection_name,
            model = %config.embedding_model,
            "initializing retrieval engine"
        );

        let ttl = Duration::from_secs(config.cache.ttl_seconds);
        let deadline = Duration::from_secs(config.query_timeout_seconds);

        let embedding_cache = config
            .cache
            .enabled
            .then(|| EmbeddingCache::new(config.cache.max_entries, ttl));
        let query_cache = config
            .cache
            .enabled
            .then(|| QueryCache::new(config.cache.max_entries, ttl));

        let retriever = Retriever::new(
            embedder,
            index,
            config.fusion.clone(),
            deadline,
            embedding_cache,
        );
        let reranker = Reranker::new(config.rerank.clone());
        let scorer = ConfidenceScorer::new(config.confidence.clone());

        Ok(Self {
            config,
            classifier: ComplexityClassifier::new(),
            retriever,
            reranker,
            scorer,
            query_cache,
            metrics: MetricsCollector::new(),
        })
    }

    /// Run a query with default options.
    pub async fn query(&self, text: &str) -> Result<QueryResult> {
        self.query_with_options(text, QueryOptions::default()).await
    }

    /// Run the full pipeline. Infrastructure failures (embedding provider or
    /// vector index unreachable, timeouts) degrade to a zero-confidence
    /// empty result instead of propagating.
    pub async fn query_with_options(
        &self,
        text: &str,
        options: QueryOptions,
    ) -> Result<QueryResult> {
        let started = Instant::now();

        if options.use_cache {
            if let Some(cache) = &self.query_cache {
                if let Some(hit) = cache.get(text).await {
                    debug!("query cache hit");
                    let mut result = (*hit).clone();
                    result.was_cached = true;
                    result.processing_time_ms = elapsed_ms(started);
                    self.metrics
                        .record_query(result.confidence, result.processing_time_ms, true, false);
                    return Ok(result);
                }
            }
        }

        let complexity = self.classifier.classify(text);
        debug!(complexity = complexity.as_str(), "classified query");

        let (documents, strategy) = match self.retriever.retrieve(text, complexity).await {
            Ok(found) => found,
            Err(e) if e.is_infrastructure() => {
                warn!(error = %e, "retrieval failed, returning degraded result");
                let result = degraded_result(complexity, started);
                self.metrics
                    .record_query(0.0, result.processing_time_ms, false, true);
                return Ok(result);
            }
            Err(e) => return Err(e),
        };

        let (documents, retrieval_method) = if complexity == QueryComplexity::Complex {
            (
                self.reranker.rerank(documents, text),
                format!("{}+rerank", strategy.as_str()),
            )
        } else {
            (documents, strategy.as_str().to_string())
        };

        let confidence = self.scorer.score(&documents, complexity);
        let low_confidence = confidence < self.config.min_confidence_threshold;

        let result = QueryResult {
            answer_context: format_answer_context(text, &documents),
            sources: documents.iter().map(SourceSummary::from).collect(),
            confidence,
            retrieval_method,
            complexity,
            processing_time_ms: elapsed_ms(started),
            was_cached: false,
        };

        if low_confidence {
            debug!(
                confidence,
                threshold = self.config.min_confidence_threshold,
                "result below confidence threshold, not caching"
            );
        } else if options.use_cache {
            if let Some(cache) = &self.query_cache {
                cache.insert(text, result.clone()).await;
            }
        }

        self.metrics
            .record_query(confidence, result.processing_time_ms, false, low_confidence);
        Ok(result)
    }

    /// Snapshot of the running metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn degraded_result(complexity: QueryComplexity, started: Instant) -> QueryResult {
    QueryResult {
        answer_context: String::new(),
        sources: Vec::new(),
        confidence: 0.0,
        retrieval_method: "failed".to_string(),
        complexity,
        processing_time_ms: elapsed_ms(started),
        was_cached: false,
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
