//! End-to-end tests: index a small corpus through the document indexer,
//! then query it through the full engine pipeline.

use async_trait::async_trait;
use sage_core::config::EngineConfig;
use sage_core::error::{Result, SageError};
use sage_core::mock::{InMemoryVectorIndex, MockEmbedder};
use sage_core::traits::EmbeddingProvider;
use sage_core::types::Vector;
use sage_ingestion::DocumentIndexer;
use sage_retrieval::{QueryComplexity, QueryOptions, RetrievalEngine, StrategyKind};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const DIM: usize = 256;

const CSP_DOC: &str = "# Cash Secured Put\n\nWhat is a CSP? A CSP is a cash secured put. Selling a CSP means selling a put while holding cash to cover assignment.";
const WHEEL_DOC: &str = "# Wheel Strategy\n\nThe wheel strategy sells cash secured puts until assignment, then sells covered calls against the shares, collecting premium on both sides.";
const MAGNUS_DOC: &str = "# Magnus Overview\n\nMagnus is an assistant for options traders. It watches positions, scans watchlists, and answers questions from the knowledge base.";

async fn engine_over_corpus() -> (RetrievalEngine, TempDir) {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = Arc::new(InMemoryVectorIndex::new(DIM));

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("csp.md"), CSP_DOC).unwrap();
    fs::write(dir.path().join("wheel.md"), WHEEL_DOC).unwrap();
    fs::write(dir.path().join("magnus.md"), MAGNUS_DOC).unwrap();

    let config = EngineConfig::default();
    let indexer = DocumentIndexer::new(embedder.clone(), index.clone(), &config.chunking);
    let report = indexer
        .index_directory(dir.path(), &["*.md"], &[])
        .await
        .unwrap();
    assert_eq!(report.indexed.len(), 3);

    let engine = RetrievalEngine::new(config, embedder, index).unwrap();
    (engine, dir)
}

#[tokio::test]
async fn test_csp_query_ranks_csp_document_first() {
    let (engine, _dir) = engine_over_corpus().await;

    let result = engine.query("What is a CSP?").await.unwrap();

    assert_eq!(result.complexity, QueryComplexity::Simple);
    assert_eq!(result.retrieval_method, "semantic");
    assert!(!result.was_cached);
    assert_eq!(result.sources.len(), 3);

    let top = &result.sources[0];
    assert_eq!(top.title.as_deref(), Some("Cash Secured Put"));
    for other in &result.sources[1..] {
        assert!(
            top.combined_score > other.combined_score,
            "top score {} not strictly above {:?} {}",
            top.combined_score,
            other.title,
            other.combined_score
        );
    }

    assert!(result.confidence >= 0.6, "confidence {}", result.confidence);
    assert!(result.answer_context.contains("Cash Secured Put"));
}

#[tokio::test]
async fn test_medium_query_uses_hybrid_strategy() {
    let (engine, _dir) = engine_over_corpus().await;

    let result = engine
        .query("How do I manage an assigned cash secured put position?")
        .await
        .unwrap();

    assert_eq!(result.complexity, QueryComplexity::Medium);
    assert_eq!(result.retrieval_method, "hybrid");
    assert!(!result.sources.is_empty());
    for source in &result.sources {
        assert_eq!(source.strategy, StrategyKind::Hybrid);
    }
    // The keyword signal contributes for documents sharing query terms
    assert!(result.sources.iter().any(|s| s.keyword_score > 0.0));
}

#[tokio::test]
async fn test_complex_query_is_reranked() {
    let (engine, _dir) = engine_over_corpus().await;

    let result = engine
        .query("compare the best strategy for wheel entries")
        .await
        .unwrap();

    assert_eq!(result.complexity, QueryComplexity::Complex);
    assert_eq!(result.retrieval_method, "hybrid+rerank");
}

#[tokio::test]
async fn test_repeat_query_is_served_from_cache() {
    let (engine, _dir) = engine_over_corpus().await;

    let first = engine.query("What is a CSP?").await.unwrap();
    assert!(!first.was_cached);

    let second = engine.query("what is a  CSP?").await.unwrap();
    assert!(second.was_cached);
    assert_eq!(second.answer_context, first.answer_context);
    assert_eq!(second.confidence, first.confidence);

    let snap = engine.metrics();
    assert_eq!(snap.total_queries, 2);
    assert_eq!(snap.cache_hits, 1);
}

#[tokio::test]
async fn test_use_cache_false_bypasses_cache() {
    let (engine, _dir) = engine_over_corpus().await;
    let options = QueryOptions { use_cache: false };

    for _ in 0..2 {
        let result = engine
            .query_with_options("What is a CSP?", options.clone())
            .await
            .unwrap();
        assert!(!result.was_cached);
    }
    assert_eq!(engine.metrics().cache_hits, 0);
}

#[tokio::test]
async fn test_empty_index_gives_zero_confidence_not_error() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let engine = RetrievalEngine::new(EngineConfig::default(), embedder, index).unwrap();

    let result = engine.query("What is a CSP?").await.unwrap();
    assert_eq!(result.confidence, 0.0);
    assert!(result.sources.is_empty());
    assert!(result.answer_context.is_empty());

    // Below-threshold results are counted as retrieval failures and never
    // cached
    let again = engine.query("What is a CSP?").await.unwrap();
    assert!(!again.was_cached);

    let snap = engine.metrics();
    assert_eq!(snap.retrieval_failures, 2);
    assert_eq!(snap.cache_hits, 0);
}

/// Provider that always fails, standing in for an unreachable service.
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vector> {
        Err(SageError::embedding("provider unreachable"))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vector>> {
        Err(SageError::embedding("provider unreachable"))
    }

    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

#[tokio::test]
async fn test_embedding_failure_degrades_to_empty_result() {
    let embedder = Arc::new(FailingEmbedder);
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let engine = RetrievalEngine::new(EngineConfig::default(), embedder, index).unwrap();

    let result = engine.query("What is a CSP?").await.unwrap();
    assert_eq!(result.confidence, 0.0);
    assert!(result.sources.is_empty());
    assert_eq!(result.retrieval_method, "failed");

    let snap = engine.metrics();
    assert_eq!(snap.retrieval_failures, 1);
    assert_eq!(snap.failure_rate, 1.0);
}

/// Provider that never resolves, standing in for a hung service.
struct HangingEmbedder;

#[async_trait]
impl EmbeddingProvider for HangingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vector> {
        std::future::pending().await
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vector>> {
        std::future::pending().await
    }

    fn model_name(&self) -> &str {
        "hanging"
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

#[tokio::test(start_paused = true)]
async fn test_hung_provider_fails_closed_on_deadline() {
    let embedder = Arc::new(HangingEmbedder);
    let index = Arc::new(InMemoryVectorIndex::new(DIM));
    let engine = RetrievalEngine::new(EngineConfig::default(), embedder, index).unwrap();

    // Paused time auto-advances past the 10s deadline instead of sleeping
    let result = engine.query("What is a CSP?").await.unwrap();
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.retrieval_method, "failed");
}

#[tokio::test]
async fn test_concurrent_queries_share_engine_state() {
    let (engine, _dir) = engine_over_corpus().await;
    let engine = Arc::new(engine);

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let query = if i % 2 == 0 {
                "What is a CSP?"
            } else {
                "wheel strategy entry rules"
            };
            engine.query(query).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(engine.metrics().total_queries, 8);
}
