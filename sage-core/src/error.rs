//! Error types for the Sage retrieval system.

/// Result type alias for Sage operations.
pub type Result<T> = std::result::Result<T, SageError>;

/// Main error type for the Sage retrieval system.
#[derive(Debug, thiserror::Error)]
pub enum SageError {
    /// Embedding provider unreachable or returned an invalid response
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index unreachable or rejected an operation
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Per-file ingestion errors (malformed or unreadable documents)
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Query processing errors
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache errors (always recoverable as a miss)
    #[error("Cache error: {0}")]
    Cache(String),

    /// External call exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Embedding dimension did not match the index
    #[error("Invalid dimension: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Wrapped anyhow errors for compatibility
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SageError {
    /// Create a new embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a new vector index error
    pub fn vector_index(msg: impl Into<String>) -> Self {
        Self::VectorIndex(msg.into())
    }

    /// Create a new ingestion error
    pub fn ingestion(msg: impl Into<String>) -> Self {
        Self::Ingestion(msg.into())
    }

    /// Create a new query error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Check if this error originated at the embedding boundary
    pub fn is_embedding(&self) -> bool {
        matches!(self, Self::Embedding(_))
    }

    /// Check if this error originated at the vector index boundary
    pub fn is_vector_index(&self) -> bool {
        matches!(self, Self::VectorIndex(_))
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// True for failures of an external collaborator (embedding provider or
    /// vector index), which the engine degrades to an empty result instead of
    /// propagating.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Embedding(_) | Self::VectorIndex(_) | Self::Timeout(_)
        )
    }
}
