//! Adaptive hybrid retrieval engine for the Sage knowledge base.
//!
//! Given a free-text query against an indexed corpus, the engine returns a
//! ranked, confidence-scored answer context:
//!
//! - **Complexity classification** picks the retrieval budget per query
//! - **Semantic, keyword, and hybrid strategies** with weighted score fusion
//! - **Reranking** of complex queries by exact-phrase and title signals
//! - **Confidence scoring** from the candidate score distribution
//! - **TTL-bounded query caching** and running metrics
//! - **Offline evaluation** (precision@k, recall@k, MRR) for tuning
//!
//! # Example
//!
//! ```no_run
//! use sage_core::{EngineConfig, InMemoryVectorIndex, MockEmbedder};
//! use sage_retrieval::RetrievalEngine;
//! use std::sync::Arc;
//!
//! # async fn example() -> sage_core::Result<()> {
//! let embedder = Arc::new(MockEmbedder::new(384));
//! let index = Arc::new(InMemoryVectorIndex::new(384));
//! let engine = RetrievalEngine::new(EngineConfig::default(), embedder, index)?;
//!
//! let result = engine.query("What is a CSP?").await?;
//! println!("{} (confidence {:.2})", result.answer_context, result.confidence);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod classifier;
pub mod confidence;
pub mod context;
pub mod engine;
pub mod eval;
pub mod metrics;
pub mod query;
pub mod rerank;
pub mod strategies;

pub use cache::{EmbeddingCache, QueryCache};
pub use classifier::{ComplexityClassifier, QueryComplexity};
pub use confidence::ConfidenceScorer;
pub use engine::{QueryOptions, QueryResult, RetrievalEngine, SourceSummary};
pub use eval::{AggregatedMetrics, MetricEvaluator, QueryEvaluation};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use rerank::Reranker;
pub use strategies::{RetrievedDocument, Retriever, StrategyKind};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::classifier::QueryComplexity;
    pub use crate::engine::{QueryOptions, QueryResult, RetrievalEngine};
    pub use crate::metrics::MetricsSnapshot;
    pub use crate::strategies::{RetrievedDocument, StrategyKind};
}
