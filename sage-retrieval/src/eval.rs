//! Offline evaluation of retrieval quality against a labeled query set.
//!
//! The rerank multipliers and confidence coefficients are hand-tuned
//! defaults; this module is the loop for tuning them: run a labeled set,
//! read precision@k / recall@k / MRR, adjust the config, repeat.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One labeled query: what was retrieved (ranked) and what is relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEvaluation {
    pub query_id: String,
    /// Retrieved document ids in ranked order
    pub retrieved: Vec<String>,
    /// Ground-truth relevant document ids
    pub relevant: HashSet<String>,
}

/// Metrics for a single query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetrics {
    pub precision_at_k: HashMap<usize, f64>,
    pub recall_at_k: HashMap<usize, f64>,
    /// Reciprocal rank of the first relevant document, 0 if none retrieved
    pub reciprocal_rank: f64,
    pub num_relevant_retrieved: usize,
    pub total_relevant: usize,
}

/// Mean metrics across a labeled query set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub mean_precision_at_k: HashMap<usize, f64>,
    pub mean_recall_at_k: HashMap<usize, f64>,
    pub mean_reciprocal_rank: f64,
    pub num_queries: usize,
}

/// Evaluator over ranked retrieval output.
#[derive(Debug, Default)]
pub struct MetricEvaluator;

impl MetricEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a single query at the given cutoffs.
    pub fn evaluate(&self, query: &QueryEvaluation, ks: &[usize]) -> QueryMetrics {
        let mut precision_at_k = HashMap::new();
        let mut recall_at_k = HashMap::new();

        for &k in ks {
            let top_k = &query.retrieved[..k.min(query.retrieved.len())];
            let hits = top_k.iter().filter(|id| query.relevant.contains(*id)).count();

            precision_at_k.insert(k, if k == 0 { 0.0 } else { hits as f64 / k as f64 });
            recall_at_k.insert(
                k,
                if query.relevant.is_empty() {
                    0.0
                } else {
                    hits as f64 / query.relevant.len() as f64
                },
            );
        }

        let reciprocal_rank = query
            .retrieved
            .iter()
            .position(|id| query.relevant.contains(id))
            .map(|pos| 1.0 / (pos + 1) as f64)
            .unwrap_or(0.0);

        let num_relevant_retrieved = query
            .retrieved
            .iter()
            .filter(|id| query.relevant.contains(*id))
            .count();

        QueryMetrics {
            precision_at_k,
            recall_at_k,
            reciprocal_rank,
            num_relevant_retrieved,
            total_relevant: query.relevant.len(),
        }
    }

    /// Mean metrics over a whole labeled set.
    pub fn aggregate(&self, queries: &[QueryEvaluation], ks: &[usize]) -> AggregatedMetrics {
        let mut mean_precision_at_k: HashMap<usize, f64> =
            ks.iter().map(|&k| (k, 0.0)).collect();
        let mut mean_recall_at_k: HashMap<usize, f64> = ks.iter().map(|&k| (k, 0.0)).collect();
        let mut mrr_sum = 0.0;

        for query in queries {
            let metrics = self.evaluate(query, ks);
            for &k in ks {
                *mean_precision_at_k.entry(k).or_insert(0.0) += metrics.precision_at_k[&k];
                *mean_recall_at_k.entry(k).or_insert(0.0) += metrics.recall_at_k[&k];
            }
            mrr_sum += metrics.reciprocal_rank;
        }

        let n = queries.len().max(1) as f64;
        mean_precision_at_k.values_mut().for_each(|v| *v /= n);
        mean_recall_at_k.values_mut().for_each(|v| *v /= n);

        AggregatedMetrics {
            mean_precision_at_k,
            mean_recall_at_k,
            mean_reciprocal_rank: mrr_sum / n,
            num_queries: queries.len(),
        }
    }
}
