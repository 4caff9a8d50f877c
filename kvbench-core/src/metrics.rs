//! # WorkloadMetrics
//!
//! Purpose: Read and write operations are tracked through independent `MetricsCore` instances,
//! so the reporter prints a `read` line and a `write` line each tick and the two series never
//! blend into a single misleading count — a batch read and a single-key read both land in
//! `read`; every write lands in `write`, even when batching is configured for reads.

use std::sync::Arc;

use kvbench_common::BenchmarkConfig;
use kvbench_metrics::{LatencyHistogram, MetricsCore};

/// The pair of `MetricsCore` instances a mixed-workload run drives: one for reads (single-key
/// and batch alike), one for writes.
pub struct WorkloadMetrics {
    /// Accumulates `get`/`batch_get` outcomes.
    pub read: Arc<MetricsCore>,
    /// Accumulates `put` outcomes.
    pub write: Arc<MetricsCore>,
}

impl WorkloadMetrics {
    /// Builds both cores, each with its own histogram instance when latency recording is
    /// enabled.
    pub fn new(config: &BenchmarkConfig) -> Self {
        let histogram_for = || {
            config
                .latency_enabled
                .then(|| LatencyHistogram::new(config.latency_columns, config.latency_shift))
        };
        WorkloadMetrics {
            read: MetricsCore::new(histogram_for()),
            write: MetricsCore::new(histogram_for()),
        }
    }

    /// Cumulative successful-operation count across both series.
    pub fn total_count(&self) -> u64 {
        self.read.total_count() + self.write.total_count()
    }

    /// Cumulative failed-operation count across both series.
    pub fn total_failures(&self) -> u64 {
        self.read.total_failures() + self.write.total_failures()
    }
}
