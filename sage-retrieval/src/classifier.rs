//! Query complexity classification.
//!
//! A deterministic heuristic, not a learned model. The class feeds
//! retrieval-breadth selection and confidence calibration.

use crate::query::{normalize, terms, word_count};
use serde::{Deserialize, Serialize};

/// Complexity tier assigned to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryComplexity {
    /// Short factual lookup
    Simple,
    /// Default tier
    Medium,
    /// Long, multi-part, or reasoning-heavy
    Complex,
}

impl QueryComplexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

/// Prefixes marking a short factual lookup.
const FACTUAL_PREFIXES: &[&str] = &["what is", "define", "who is", "when did"];

/// Words that signal multi-step reasoning. Two distinct hits are required:
/// a lone "how" still reads as a lookup ("how do I find good
/// opportunities"), while "best strategy" or "how ... compare" does not.
const REASONING_WORDS: &[&str] = &[
    "why", "how", "compare", "analyze", "strategy", "best", "optimize",
];

const SIMPLE_MAX_WORDS: usize = 7;
const COMPLEX_MIN_WORDS: usize = 15;

/// Rule-based complexity classifier.
#[derive(Debug, Clone, Default)]
pub struct ComplexityClassifier;

impl ComplexityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a raw query string. Rules in priority order:
    /// factual prefix + short → Simple; very long or multi-question →
    /// Complex; two reasoning indicators → Complex; otherwise Medium.
    pub fn classify(&self, query: &str) -> QueryComplexity {
        let normalized = normalize(query);
        let words = word_count(&normalized);

        if words < SIMPLE_MAX_WORDS
            && FACTUAL_PREFIXES
                .iter()
                .any(|prefix| normalized.starts_with(prefix))
        {
            return QueryComplexity::Simple;
        }

        let question_marks = normalized.matches('?').count();
        if words > COMPLEX_MIN_WORDS || question_marks > 1 {
            return QueryComplexity::Complex;
        }

        let query_terms = terms(&normalized);
        let indicators = REASONING_WORDS
            .iter()
            .filter(|w| query_terms.contains(**w))
            .count();
        if indicators >= 2 {
            return QueryComplexity::Complex;
        }

        QueryComplexity::Medium
    }
}
