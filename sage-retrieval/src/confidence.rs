//! Confidence estimation from the score distribution of the final ranked
//! candidate set. The estimate reflects retrieval agreement, not answer
//! correctness.

use crate::classifier::QueryComplexity;
use crate::strategies::RetrievedDocument;
use sage_core::config::ConfidenceConfig;

/// Derives a single [0, 1] reliability estimate per query.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    /// Score the final ranked set. Empty set → 0.0; everything else starts
    /// from the top document's combined score and is adjusted by the
    /// distribution heuristics, then clamped.
    pub fn score(&self, documents: &[RetrievedDocument], complexity: QueryComplexity) -> f32 {
        let Some(top) = documents.first() else {
            return 0.0;
        };

        let mut confidence = top.combined_score;

        // Clear winner: a wide gap to the runner-up
        if let Some(second) = documents.get(1) {
            if top.combined_score - second.combined_score > self.config.clear_winner_gap {
                confidence *= self.config.clear_winner_boost;
            }
        }

        let supporting = documents
            .iter()
            .filter(|d| d.combined_score > self.config.support_threshold)
            .count();

        // Corroborating evidence across several strong documents
        if supporting >= self.config.corroboration_min_docs {
            confidence *= self.config.corroboration_boost;
        }

        // Simple factual queries are answerable with high confidence or not
        // at all
        if complexity == QueryComplexity::Simple
            && top.combined_score > self.config.simple_high_score
        {
            confidence *= self.config.simple_boost;
        }

        // Complex questions need broader support
        if complexity == QueryComplexity::Complex && supporting < self.config.complex_support_min {
            confidence *= self.config.complex_penalty;
        }

        confidence.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyKind;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use sage_core::types::ChunkMetadata;

    fn doc(combined: f32) -> RetrievedDocument {
        RetrievedDocument {
            content: String::new(),
            metadata: ChunkMetadata::default(),
            similarity_score: combined,
            keyword_score: 0.0,
            combined_score: combined,
            strategy: StrategyKind::Hybrid,
        }
    }

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(ConfidenceConfig::default())
    }

    #[test]
    fn test_empty_set_is_zero() {
        assert_eq!(scorer().score(&[], QueryComplexity::Medium), 0.0);
    }

    #[test]
    fn test_single_document_base_score() {
        let docs = vec![doc(0.5)];
        assert_relative_eq!(
            scorer().score(&docs, QueryComplexity::Medium),
            0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_clear_winner_boost() {
        let docs = vec![doc(0.7), doc(0.4)];
        // gap 0.3 > 0.2
        assert_relative_eq!(
            scorer().score(&docs, QueryComplexity::Medium),
            0.7 * 1.1,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_no_boost_for_narrow_gap() {
        let docs = vec![doc(0.7), doc(0.65)];
        assert_relative_eq!(
            scorer().score(&docs, QueryComplexity::Medium),
            0.7,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_corroboration_boost() {
        let docs = vec![doc(0.7), doc(0.68), doc(0.65)];
        // three documents above 0.6, gap below 0.2
        assert_relative_eq!(
            scorer().score(&docs, QueryComplexity::Medium),
            0.7 * 1.05,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_simple_high_score_boost() {
        let docs = vec![doc(0.82), doc(0.55)];
        // clear winner and simple-high both apply
        assert_relative_eq!(
            scorer().score(&docs, QueryComplexity::Simple),
            0.82 * 1.1 * 1.1,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_complex_penalty_for_thin_support() {
        let docs = vec![doc(0.7), doc(0.65), doc(0.3)];
        // two supporting documents, fewer than the five complex needs
        assert_relative_eq!(
            scorer().score(&docs, QueryComplexity::Complex),
            0.7 * 0.9,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_clamped_to_one() {
        let docs = vec![doc(0.99), doc(0.2)];
        let c = scorer().score(&docs, QueryComplexity::Simple);
        assert_relative_eq!(c, 1.0, epsilon = 1e-6);
    }

    proptest! {
        /// Confidence is always within [0, 1] for any score distribution
        /// and complexity class.
        #[test]
        fn prop_confidence_bounds(
            scores in proptest::collection::vec(-1.0f32..=1.5, 0..12),
            complexity_idx in 0usize..3,
        ) {
            let docs: Vec<RetrievedDocument> = scores.into_iter().map(doc).collect();
            let complexity = [
                QueryComplexity::Simple,
                QueryComplexity::Medium,
                QueryComplexity::Complex,
            ][complexity_idx];

            let c = scorer().score(&docs, complexity);
            prop_assert!((0.0..=1.0).contains(&c));
            if docs.is_empty() {
                prop_assert_eq!(c, 0.0);
            }
        }
    }
}
