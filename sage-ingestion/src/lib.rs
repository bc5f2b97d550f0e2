//! Document ingestion for the Sage retrieval system.
//!
//! This crate turns raw files into embedded, deduplicated chunks:
//! - Semantic-boundary chunking (headers, paragraphs, hard split) with
//!   overlap carry between chunks
//! - Metadata extraction (title, category, word count, reading time)
//! - Whole-document deduplication by content hash
//! - Partial-failure-tolerant directory walks with include/exclude globs

pub mod chunker;
pub mod extractor;
pub mod indexer;

pub use chunker::SemanticChunker;
pub use extractor::extract_metadata;
pub use indexer::{DocumentIndexer, IndexReport};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chunker::SemanticChunker;
    pub use crate::indexer::{DocumentIndexer, IndexReport};
}
