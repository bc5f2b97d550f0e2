//! Document indexer: reads files, chunks them at semantic boundaries,
//! deduplicates whole documents by content hash, and hands embedded chunks
//! to the vector index one batch per document.

use crate::chunker::SemanticChunker;
use crate::extractor::extract_metadata;
use dashmap::DashSet;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use sage_core::config::ChunkingConfig;
use sage_core::error::{Result, SageError};
use sage_core::traits::{EmbeddingProvider, IndexEntry, VectorIndex};
use sage_core::types::DocumentChunk;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a directory indexing run.
#[derive(Debug, Default)]
pub struct IndexReport {
    /// Files whose chunks were added to the index
    pub indexed: Vec<PathBuf>,
    /// Files skipped because their content hash was already indexed
    pub skipped: Vec<PathBuf>,
    /// Files that failed, with the reason; never fatal for the run
    pub failed: Vec<(PathBuf, String)>,
    /// Total chunks produced across all indexed files
    pub chunk_count: usize,
}

enum FileOutcome {
    Indexed(Vec<DocumentChunk>),
    DuplicateSkipped,
    Empty,
}

/// Splits documents into chunks and populates the vector index.
///
/// The embedding provider and vector index are injected; the indexer owns
/// only the dedup set, which is shared across concurrent runs.
pub struct DocumentIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: SemanticChunker,
    seen_hashes: DashSet<String>,
}

impl DocumentIndexer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: &ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            chunker: SemanticChunker::new(config),
            seen_hashes: DashSet::new(),
        }
    }

    /// Index a single file. Returns the chunks produced; an unchanged
    /// document seen before produces zero chunks (idempotent re-indexing),
    /// as does an empty file.
    pub async fn index_file(&self, path: &Path) -> Result<Vec<DocumentChunk>> {
        match self.process_file(path).await? {
            FileOutcome::Indexed(chunks) => Ok(chunks),
            FileOutcome::DuplicateSkipped | FileOutcome::Empty => Ok(Vec::new()),
        }
    }

    /// Index every matching file under `root`. `patterns` are gitignore-style
    /// globs selecting files (empty = all); `excludes` are globs removing
    /// matches. Per-file failures are recorded and logged, never fatal.
    pub async fn index_directory(
        &self,
        root: &Path,
        patterns: &[&str],
        excludes: &[&str],
    ) -> Result<IndexReport> {
        let walker = self.build_walker(root, patterns, excludes)?;
        let mut report = IndexReport::default();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            match self.process_file(path).await {
                Ok(FileOutcome::Indexed(chunks)) => {
                    report.chunk_count += chunks.len();
                    report.indexed.push(path.to_path_buf());
                }
                Ok(FileOutcome::DuplicateSkipped) => {
                    debug!(path = %path.display(), "document already indexed, skipping");
                    report.skipped.push(path.to_path_buf());
                }
                Ok(FileOutcome::Empty) => {
                    debug!(path = %path.display(), "empty document, nothing to index");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to index file");
                    report.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        info!(
            indexed = report.indexed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            chunks = report.chunk_count,
            "directory indexing complete"
        );
        Ok(report)
    }

    /// Number of distinct documents indexed so far.
    pub fn document_count(&self) -> usize {
        self.seen_hashes.len()
    }

    async fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SageError::ingestion(format!("{}: {}", path.display(), e)))?;

        if content.trim().is_empty() {
            return Ok(FileOutcome::Empty);
        }

        let doc_hash = blake3::hash(content.as_bytes()).to_hex().to_string();
        if !self.seen_hashes.insert(doc_hash.clone()) {
            return Ok(FileOutcome::DuplicateSkipped);
        }

        let metadata = extract_metadata(path, &content);
        let pieces = self.chunker.chunk(&content);
        let total_chunks = pieces.len();

        let chunks: Vec<DocumentChunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| DocumentChunk {
                content,
                metadata: metadata.clone(),
                chunk_id: format!("{}-{}", &doc_hash[..12], chunk_index),
                doc_hash: doc_hash.clone(),
                chunk_index,
                total_chunks,
            })
            .collect();

        if chunks.is_empty() {
            return Ok(FileOutcome::Empty);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(SageError::embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        // One add per document keeps visibility atomic: queries see either
        // none or all of a document's chunks.
        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry {
                id: chunk.chunk_id.clone(),
                vector,
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
            })
            .collect();
        self.index.add(entries).await?;

        debug!(path = %path.display(), chunks = chunks.len(), "indexed document");
        Ok(FileOutcome::Indexed(chunks))
    }

    fn build_walker(
        &self,
        root: &Path,
        patterns: &[&str],
        excludes: &[&str],
    ) -> Result<ignore::Walk> {
        let mut overrides = OverrideBuilder::new(root);
        for pattern in patterns {
            overrides
                .add(pattern)
                .map_err(|e| SageError::config(format!("bad include pattern: {}", e)))?;
        }
        for exclude in excludes {
            overrides
                .add(&format!("!{}", exclude))
                .map_err(|e| SageError::config(format!("bad exclude pattern: {}", e)))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| SageError::config(format!("bad glob set: {}", e)))?;

        Ok(WalkBuilder::new(root)
            .overrides(overrides)
            .standard_filters(false)
            .hidden(true)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build())
    }
}
