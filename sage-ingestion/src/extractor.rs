//! Metadata extraction from documents.
//!
//! Title comes from the first markdown heading when one exists, otherwise
//! from the file stem. Category is the parent directory segment, which maps
//! directory layout (e.g. `kb/options/csp.md`) onto a browsable facet.

use chrono::Utc;
use regex::Regex;
use sage_core::types::ChunkMetadata;
use std::path::Path;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// Average adult reading speed used for the reading-time estimate.
const WORDS_PER_MINUTE: f64 = 200.0;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+(.+)$").expect("valid heading regex"));

/// Extract document-level metadata shared by all chunks of one file.
pub fn extract_metadata(path: &Path, content: &str) -> ChunkMetadata {
    let word_count = content.unicode_words().count();

    ChunkMetadata {
        title: extract_title(path, content),
        category: extract_category(path),
        source: Some(path.to_string_lossy().to_string()),
        word_count: Some(word_count),
        reading_time_minutes: Some((word_count as f64 / WORDS_PER_MINUTE).ceil() as u64),
        indexed_at: Some(Utc::now()),
        ..Default::default()
    }
}

/// First markdown heading, else the file stem.
fn extract_title(path: &Path, content: &str) -> Option<String> {
    if let Some(caps) = HEADING_RE.captures(content) {
        return Some(caps[1].trim().to_string());
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace(['_', '-'], " "))
}

/// Parent directory segment.
fn extract_category(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}
