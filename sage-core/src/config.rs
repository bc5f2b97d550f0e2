//! Configuration for the Sage retrieval engine.
//!
//! Plain serde structs with defaults, loadable from a TOML file and
//! overridable through `SAGE_*` environment variables. The host constructs
//! one `EngineConfig` at startup and passes it down; nothing here is global.

use crate::error::{Result, SageError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable names recognized as overrides.
pub const ENV_CACHE_TTL_SECONDS: &str = "SAGE_CACHE_TTL_SECONDS";
pub const ENV_MIN_CONFIDENCE: &str = "SAGE_MIN_CONFIDENCE_THRESHOLD";
pub const ENV_CHUNK_SIZE: &str = "SAGE_CHUNK_SIZE";
pub const ENV_QUERY_TIMEOUT_SECONDS: &str = "SAGE_QUERY_TIMEOUT_SECONDS";
pub const ENV_COLLECTION_NAME: &str = "SAGE_COLLECTION_NAME";

/// Main configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logical collection the engine serves
    pub collection_name: String,

    /// Identifier of the external embedding model (opaque to the engine)
    pub embedding_model: String,

    /// Results below this confidence are flagged as retrieval failures and
    /// never cached
    pub min_confidence_threshold: f32,

    /// Deadline for each external call (embedding, vector index)
    pub query_timeout_seconds: u64,

    pub chunking: ChunkingConfig,
    pub cache: CacheConfig,
    pub fusion: FusionConfig,
    pub rerank: RerankConfig,
    pub confidence: ConfidenceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection_name: "knowledge_base".to_string(),
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            min_confidence_threshold: 0.6,
            query_timeout_seconds: 10,
            chunking: ChunkingConfig::default(),
            cache: CacheConfig::default(),
            fusion: FusionConfig::default(),
            rerank: RerankConfig::default(),
            confidence: ConfidenceConfig::default(),
        }
    }
}

/// Chunking parameters for the document indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,

    /// Trailing characters carried into the next chunk
    pub chunk_overlap: usize,

    /// Chunks smaller than this are merged into a neighbor or dropped
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 100,
        }
    }
}

/// Query cache parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Entries older than this are treated as misses on read
    pub ttl_seconds: u64,

    /// Capacity bound guarding unbounded growth in long-lived processes
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
            max_entries: 1024,
        }
    }
}

/// Hybrid fusion and adaptive retrieval-breadth parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Semantic weight for medium-complexity queries
    pub alpha_medium: f32,

    /// Semantic weight for complex queries (keyword signal weighted higher)
    pub alpha_complex: f32,

    pub simple_top_k: usize,
    pub medium_top_k: usize,
    pub complex_top_k: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            alpha_medium: 0.7,
            alpha_complex: 0.6,
            simple_top_k: 3,
            medium_top_k: 5,
            complex_top_k: 10,
        }
    }
}

/// Reranker boost multipliers. Hand-tuned defaults; tune offline with the
/// evaluation module rather than editing code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Applied when the lowercased query appears verbatim in the content
    pub exact_phrase_boost: f32,

    /// Applied when the query appears in the title metadata field
    pub title_boost: f32,

    /// Applied when content length exceeds `length_penalty_threshold`
    pub length_penalty: f32,

    pub length_penalty_threshold: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            exact_phrase_boost: 1.3,
            title_boost: 1.2,
            length_penalty: 0.9,
            length_penalty_threshold: 5000,
        }
    }
}

/// Confidence heuristic coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Score gap to the runner-up that signals a clear winner
    pub clear_winner_gap: f32,
    pub clear_winner_boost: f32,

    /// Combined score above which a document counts as relevant support
    pub support_threshold: f32,

    /// Documents above `support_threshold` needed for corroboration
    pub corroboration_min_docs: usize,
    pub corroboration_boost: f32,

    /// Top score above which a simple factual query is considered answered
    pub simple_high_score: f32,
    pub simple_boost: f32,

    /// Minimum supporting documents a complex query needs
    pub complex_support_min: usize,
    pub complex_penalty: f32,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            clear_winner_gap: 0.2,
            clear_winner_boost: 1.1,
            support_threshold: 0.6,
            corroboration_min_docs: 3,
            corroboration_boost: 1.05,
            simple_high_score: 0.8,
            simple_boost: 1.1,
            complex_support_min: 5,
            complex_penalty: 0.9,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: EngineConfig = toml::from_str(&raw)
            .map_err(|e| SageError::config(format!("failed to parse config: {}", e)))?;
        config.apply_env_overrides();
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded configuration");
        Ok(config)
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(ENV_COLLECTION_NAME) {
            self.collection_name = v;
        }
        if let Ok(v) = std::env::var(ENV_CACHE_TTL_SECONDS) {
            if let Ok(ttl) = v.parse() {
                self.cache.ttl_seconds = ttl;
            }
        }
        if let Ok(v) = std::env::var(ENV_MIN_CONFIDENCE) {
            if let Ok(t) = v.parse() {
                self.min_confidence_threshold = t;
            }
        }
        if let Ok(v) = std::env::var(ENV_CHUNK_SIZE) {
            if let Ok(size) = v.parse() {
                self.chunking.chunk_size = size;
            }
        }
        if let Ok(v) = std::env::var(ENV_QUERY_TIMEOUT_SECONDS) {
            if let Ok(secs) = v.parse() {
                self.query_timeout_seconds = secs;
            }
        }
    }

    /// Validate cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        if self.collection_name.is_empty() {
            return Err(SageError::config("collection_name must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence_threshold) {
            return Err(SageError::config(
                "min_confidence_threshold must be in [0, 1]",
            ));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(SageError::config(
                "chunk_overlap must be smaller than chunk_size",
            ));
        }
        if self.chunking.min_chunk_size > self.chunking.chunk_size {
            return Err(SageError::config(
                "min_chunk_size must not exceed chunk_size",
            ));
        }
        for (name, alpha) in [
            ("alpha_medium", self.fusion.alpha_medium),
            ("alpha_complex", self.fusion.alpha_complex),
        ] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(SageError::config(format!("{} must be in [0, 1]", name)));
            }
        }
        if self.query_timeout_seconds == 0 {
            return Err(SageError::config("query_timeout_seconds must be positive"));
        }
        Ok(())
    }
}
