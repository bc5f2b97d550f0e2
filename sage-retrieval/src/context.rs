//! Deterministic answer-context formatting.
//!
//! The engine has no language model of its own; when no answer generator is
//! attached downstream, this formatted block IS the result, which keeps the
//! retrieval layer testable in isolation.

use crate::strategies::RetrievedDocument;
use std::fmt::Write;

/// Format the ranked sources into a numbered context block.
pub fn format_answer_context(query: &str, documents: &[RetrievedDocument]) -> String {
    if documents.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Context for: {}", query.trim());

    for (i, doc) in documents.iter().enumerate() {
        let title = doc.metadata.title.as_deref().unwrap_or("untitled");
        let _ = write!(out, "\n[{}] {}", i + 1, title);
        if let Some(category) = &doc.metadata.category {
            let _ = write!(out, " ({})", category);
        }
        let _ = writeln!(out, " - score {:.3}", doc.combined_score);
        let _ = writeln!(out, "{}", doc.content.trim());
    }

    out
}
