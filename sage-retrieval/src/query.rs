//! Query normalization and term extraction.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Lowercase, collapse whitespace, trim. Cache keys and classification both
/// work on this form, so `"What is a CSP?"` and `"what is a  csp?"` are the
/// same query.
pub fn normalize(query: &str) -> String {
    let lowered = query.to_lowercase();
    WHITESPACE_RE.replace_all(&lowered, " ").trim().to_string()
}

/// Lowercased unicode words. No stop-word filtering: the keyword overlap
/// formula is defined over the full term set.
pub fn terms(text: &str) -> HashSet<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// Word count of a query, used by the complexity rules.
pub fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}
