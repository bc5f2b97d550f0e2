//! Running aggregates for observability. Process-lifetime scope, O(1) per
//! query via the incremental mean formula.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
struct MetricsInner {
    total_queries: u64,
    cache_hits: u64,
    retrieval_failures: u64,
    avg_confidence: f64,
    avg_processing_time_ms: f64,
}

/// Point-in-time view of the collected metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    pub cache_hits: u64,
    pub retrieval_failures: u64,
    pub cache_hit_rate: f64,
    pub failure_rate: f64,
    pub avg_confidence: f64,
    pub avg_processing_time_ms: f64,
}

/// Concurrent-safe collector owned by one engine instance.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    inner: RwLock<MetricsInner>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed query. `failure` means the confidence fell below
    /// the configured threshold or an external collaborator failed.
    pub fn record_query(
        &self,
        confidence: f32,
        processing_time_ms: f64,
        was_cached: bool,
        failure: bool,
    ) {
        let mut inner = self.inner.write();

        inner.total_queries += 1;
        if was_cached {
            inner.cache_hits += 1;
        }
        if failure {
            inner.retrieval_failures += 1;
        }

        let n = inner.total_queries as f64;
        inner.avg_confidence += (confidence as f64 - inner.avg_confidence) / n;
        inner.avg_processing_time_ms +=
            (processing_time_ms - inner.avg_processing_time_ms) / n;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.read();
        let total = inner.total_queries;

        MetricsSnapshot {
            total_queries: total,
            cache_hits: inner.cache_hits,
            retrieval_failures: inner.retrieval_failures,
            cache_hit_rate: ratio(inner.cache_hits, total),
            failure_rate: ratio(inner.retrieval_failures, total),
            avg_confidence: inner.avg_confidence,
            avg_processing_time_ms: inner.avg_processing_time_ms,
        }
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_snapshot() {
        let metrics = MetricsCollector::new();
        let snap = metrics.snapshot();
        assert_eq!(snap.total_queries, 0);
        assert_eq!(snap.cache_hit_rate, 0.0);
        assert_eq!(snap.avg_confidence, 0.0);
    }

    #[test]
    fn test_running_averages() {
        let metrics = MetricsCollector::new();
        metrics.record_query(0.8, 10.0, false, false);
        metrics.record_query(0.4, 30.0, true, true);

        let snap = metrics.snapshot();
        assert_eq!(snap.total_queries, 2);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.retrieval_failures, 1);
        assert_relative_eq!(snap.avg_confidence, 0.6, epsilon = 1e-9);
        assert_relative_eq!(snap.avg_processing_time_ms, 20.0, epsilon = 1e-9);
        assert_relative_eq!(snap.cache_hit_rate, 0.5, epsilon = 1e-9);
        assert_relative_eq!(snap.failure_rate, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_incremental_mean_matches_batch_mean() {
        let metrics = MetricsCollector::new();
        let confidences = [0.1f32, 0.9, 0.7, 0.3, 0.5, 0.65];
        for c in confidences {
            metrics.record_query(c, 5.0, false, false);
        }

        let expected: f64 =
            confidences.iter().map(|c| *c as f64).sum::<f64>() / confidences.len() as f64;
        assert_relative_eq!(metrics.snapshot().avg_confidence, expected, epsilon = 1e-6);
    }
}
