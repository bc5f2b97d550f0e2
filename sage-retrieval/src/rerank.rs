//! Second-pass rescoring of the candidate set using signals the first pass
//! does not see: exact-phrase presence, title match, and document length.
//! Only invoked for complex queries.

use crate::query::normalize;
use crate::strategies::RetrievedDocument;
use sage_core::config::RerankConfig;
use tracing::debug;

/// Applies multiplicative boosts and re-sorts the candidate set.
#[derive(Debug, Clone)]
pub struct Reranker {
    config: RerankConfig,
}

impl Reranker {
    pub fn new(config: RerankConfig) -> Self {
        Self { config }
    }

    /// Stable resort by adjusted `combined_score`, descending.
    pub fn rerank(&self, mut documents: Vec<RetrievedDocument>, query: &str) -> Vec<RetrievedDocument> {
        let needle = normalize(query);

        for doc in &mut documents {
            let mut score = doc.combined_score;

            if doc.content.to_lowercase().contains(&needle) {
                score *= self.config.exact_phrase_boost;
            }

            if let Some(title) = &doc.metadata.title {
                if title.to_lowercase().contains(&needle) {
                    score *= self.config.title_boost;
                }
            }

            // Long documents are statistically less focused
            if doc.content.chars().count() > self.config.length_penalty_threshold {
                score *= self.config.length_penalty;
            }

            doc.combined_score = score;
        }

        documents.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(documents = documents.len(), "reranking complete");
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyKind;
    use approx::assert_relative_eq;
    use sage_core::types::ChunkMetadata;

    fn doc(content: &str, title: Option<&str>, combined: f32) -> RetrievedDocument {
        RetrievedDocument {
            content: content.to_string(),
            metadata: ChunkMetadata {
                title: title.map(|t| t.to_string()),
                ..Default::default()
            },
            similarity_score: combined,
            keyword_score: 0.0,
            combined_score: combined,
            strategy: StrategyKind::Hybrid,
        }
    }

    fn reranker() -> Reranker {
        Reranker::new(RerankConfig::default())
    }

    #[test]
    fn test_exact_phrase_boost() {
        let docs = vec![doc("nothing relevant here", None, 0.5)];
        let out = reranker().rerank(docs, "nothing RELEVANT");
        assert_relative_eq!(out[0].combined_score, 0.5 * 1.3, epsilon = 1e-6);
    }

    #[test]
    fn test_title_boost() {
        let docs = vec![doc("body text", Some("Wheel Strategy Guide"), 0.5)];
        let out = reranker().rerank(docs, "wheel strategy");
        assert_relative_eq!(out[0].combined_score, 0.5 * 1.2, epsilon = 1e-6);
    }

    #[test]
    fn test_length_penalty() {
        let long = "x".repeat(5001);
        let docs = vec![doc(&long, None, 0.5)];
        let out = reranker().rerank(docs, "query not present");
        assert_relative_eq!(out[0].combined_score, 0.5 * 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_boosts_stack_multiplicatively() {
        let docs = vec![doc("the exact query text", Some("exact query text notes"), 0.4)];
        let out = reranker().rerank(docs, "exact query text");
        assert_relative_eq!(out[0].combined_score, 0.4 * 1.3 * 1.2, epsilon = 1e-6);
    }

    #[test]
    fn test_boosted_document_overtakes_higher_base_score() {
        let docs = vec![
            doc("generic filler content", None, 0.6),
            doc("contains covered call rolling verbatim", None, 0.55),
        ];
        let out = reranker().rerank(docs, "covered call rolling");
        assert!(out[0].content.contains("covered call"));
    }

    #[test]
    fn test_ties_keep_original_order() {
        let docs = vec![doc("first", None, 0.5), doc("second", None, 0.5)];
        let out = reranker().rerank(docs, "unmatched");
        assert_eq!(out[0].content, "first");
        assert_eq!(out[1].content, "second");
    }
}
