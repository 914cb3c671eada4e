//! Source metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total samples delivered to attempts
    pub samples_delivered: AtomicU64,

    /// Samples rejected as non-finite or unparsable
    pub samples_rejected: AtomicU64,

    /// Completed collections
    pub collections: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished collection of `samples` samples
    pub fn record_collection(&self, source: &str, samples: usize) {
        self.samples_delivered
            .fetch_add(samples as u64, Ordering::Relaxed);
        self.collections.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("ingestion_samples_total", "source" => source.to_string())
            .increment(samples as u64);
    }

    /// Record rejected samples
    pub fn record_rejected(&self, source: &str, count: usize) {
        if count == 0 {
            return;
        }
        self.samples_rejected
            .fetch_add(count as u64, Ordering::Relaxed);
        metrics::counter!("ingestion_rejected_total", "source" => source.to_string())
            .increment(count as u64);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_delivered: self.samples_delivered.load(Ordering::Relaxed),
            samples_rejected: self.samples_rejected.load(Ordering::Relaxed),
            collections: self.collections.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total samples delivered to attempts
    pub samples_delivered: u64,

    /// Samples rejected as non-finite or unparsable
    pub samples_rejected: u64,

    /// Completed collections
    pub collections: u64,
}
