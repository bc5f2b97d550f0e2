//! Caching layer for query results and query embeddings.
//!
//! The query cache is keyed by a case-folded hash of the normalized query,
//! so the cached result is returned regardless of which strategy produced
//! it. Expiry is lazy: an entry past its TTL is simply not returned on read.

use crate::engine::QueryResult;
use crate::query::normalize;
use moka::future::Cache;
use sage_core::types::Vector;
use std::sync::Arc;
use std::time::Duration;

/// Cache key for embeddings: the text together with the model that embedded
/// it, so a model swap never serves stale vectors.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EmbeddingCacheKey {
    text: String,
    model: String,
}

impl EmbeddingCacheKey {
    pub fn new(text: String, model: String) -> Self {
        Self { text, model }
    }
}

/// Cache for query embeddings.
pub struct EmbeddingCache {
    cache: Cache<EmbeddingCacheKey, Arc<Vector>>,
}

impl EmbeddingCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &EmbeddingCacheKey) -> Option<Arc<Vector>> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: EmbeddingCacheKey, vector: Vector) {
        self.cache.insert(key, Arc::new(vector)).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// TTL- and capacity-bounded memo of query → result.
pub struct QueryCache {
    cache: Cache<String, Arc<QueryResult>>,
}

impl QueryCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Case-folded hash of the normalized query.
    fn key(query: &str) -> String {
        blake3::hash(normalize(query).as_bytes()).to_hex().to_string()
    }

    pub async fn get(&self, query: &str) -> Option<Arc<QueryResult>> {
        self.cache.get(&Self::key(query)).await
    }

    pub async fn insert(&self, query: &str, result: QueryResult) {
        self.cache.insert(Self::key(query), Arc::new(result)).await;
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
