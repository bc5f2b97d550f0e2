//! Semantic-boundary chunking.
//!
//! Boundary priority: markdown section headers first, paragraph breaks for
//! header-less text or oversized sections, hard character windows as the
//! last resort. Sections accumulate into a running buffer that is flushed
//! whenever the next section would overflow `chunk_size`; each flush carries
//! the trailing `chunk_overlap` characters into the next chunk so a sentence
//! spanning a boundary stays retrievable. Chunks below `min_chunk_size` are
//! merged into the previous chunk or dropped.

use regex::Regex;
use sage_core::config::ChunkingConfig;
use std::sync::LazyLock;

static SECTION_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s").expect("valid header regex"));

/// Splits document text at semantic boundaries.
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    chunk_size: usize,
    overlap: usize,
    min_chunk_size: usize,
}

impl SemanticChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
            min_chunk_size: config.min_chunk_size,
        }
    }

    /// Chunk `content` into pieces of `min_chunk_size..=chunk_size + overlap`
    /// characters. Empty or whitespace-only input produces no chunks.
    pub fn chunk(&self, content: &str) -> Vec<String> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let units = self.split_units(content);
        let chunks = self.accumulate(units);
        self.enforce_min_size(chunks)
    }

    /// Break the document into units no larger than `chunk_size`, trying
    /// headers, then paragraphs, then hard windows.
    fn split_units(&self, content: &str) -> Vec<String> {
        let mut units = Vec::new();

        for section in split_sections(content) {
            if char_len(&section) <= self.chunk_size {
                units.push(section);
                continue;
            }

            for paragraph in split_paragraphs(&section) {
                if char_len(&paragraph) <= self.chunk_size {
                    units.push(paragraph);
                } else {
                    units.extend(self.hard_split(&paragraph));
                }
            }
        }

        units
    }

    /// Fixed-size character windows with overlap, for text that has no
    /// usable boundary.
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            pieces.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start = end - self.overlap.min(self.chunk_size - 1);
        }

        pieces
    }

    /// Accumulate units into a running buffer, flushing on overflow and
    /// seeding each new buffer with the previous chunk's tail. The seed is
    /// shortened by the join width so flushed chunks never exceed
    /// `chunk_size + overlap`.
    fn accumulate(&self, units: Vec<String>) -> Vec<String> {
        const JOIN: &str = "\n\n";

        let mut chunks = Vec::new();
        let mut buffer = String::new();
        // Chars of `buffer` that are overlap carry, not counted against
        // `chunk_size`.
        let mut carry_len = 0;

        for unit in units {
            let unit_len = char_len(&unit);
            let buffered = char_len(&buffer).saturating_sub(carry_len);

            if !buffer.is_empty() && buffered + JOIN.len() + unit_len > self.chunk_size {
                chunks.push(buffer.trim().to_string());
                let seed = tail_chars(&buffer, self.overlap.saturating_sub(JOIN.len()));
                carry_len = char_len(&seed);
                buffer = seed;
            }

            if !buffer.is_empty() {
                buffer.push_str(JOIN);
            }
            buffer.push_str(&unit);
        }

        if !buffer.trim().is_empty() {
            chunks.push(buffer.trim().to_string());
        }

        chunks
    }

    /// Merge undersized chunks into their predecessor when the result stays
    /// within bounds, otherwise drop them.
    fn enforce_min_size(&self, chunks: Vec<String>) -> Vec<String> {
        let max_len = self.chunk_size + self.overlap;
        let mut kept: Vec<String> = Vec::new();

        for chunk in chunks {
            if char_len(&chunk) >= self.min_chunk_size {
                kept.push(chunk);
                continue;
            }

            if let Some(prev) = kept.last_mut() {
                if char_len(prev) + 2 + char_len(&chunk) <= max_len {
                    prev.push_str("\n\n");
                    prev.push_str(&chunk);
                    continue;
                }
            }
            // No neighbor with room: a near-empty vector would pollute the
            // index more than the lost text is worth.
            tracing::debug!(len = char_len(&chunk), "dropping undersized chunk");
        }

        kept
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of `s`.
fn tail_chars(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let start = chars.len().saturating_sub(n);
    chars[start..].iter().collect()
}

/// Split at markdown section headers. A document without headers is one
/// section.
fn split_sections(content: &str) -> Vec<String> {
    let mut boundaries: Vec<usize> = SECTION_HEADER_RE
        .find_iter(content)
        .map(|m| m.start())
        .collect();

    if boundaries.is_empty() {
        return vec![content.trim().to_string()];
    }

    if boundaries[0] != 0 {
        boundaries.insert(0, 0);
    }
    boundaries.push(content.len());

    boundaries
        .windows(2)
        .map(|w| content[w[0]..w[1]].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
