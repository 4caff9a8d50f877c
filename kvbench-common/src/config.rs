//! # Benchmark Configuration
//!
//! Purpose: A plain, immutable record describing one benchmark run. The core accepts it as a
//! typed value and never parses text itself — loading it from the environment is the binary
//! crate's job (see `kvbench-cli`).
//!
//! ## Design Principles
//! 1. **Validate Once, Trust Forever**: `BenchmarkConfig::validate` is the single gate; once a
//!    config is built, every downstream component can assume its invariants hold.
//! 2. **Read-Only, Shared**: Callers hold the config behind an `Arc` and never mutate it.

use crate::error::BenchError;

/// Execution model for the workload driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One OS thread per worker, blocking `DbClient` calls.
    Sync,
    /// Cooperative tokio tasks, `in_flight_max` concurrent slots.
    Async,
}

/// Shape of the generated bin value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinType {
    /// A single random integer payload.
    Int,
    /// `bin_size` printable ASCII characters.
    Str,
    /// `bin_size` uniform random bytes.
    Bytes,
}

/// Immutable, validated description of one benchmark run.
///
/// Built once by the orchestrator's caller (typically the CLI binary) and shared read-only
/// behind an `Arc` for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Comma-separated database hosts; opaque to the core, threaded through to the `DbClient`.
    pub hosts: String,
    /// Namespace the `DbClient` should target; opaque to the core.
    pub namespace: String,
    /// Set the `DbClient` should target; opaque to the core.
    pub set: String,
    /// Execution model.
    pub mode: Mode,
    /// Number of workers (threads in sync mode, slots in async mode).
    pub worker_count: usize,
    /// Maximum concurrent in-flight operations (async mode only).
    pub in_flight_max: usize,
    /// Per-process throughput ceiling; `0` disables throttling.
    pub target_tps: u64,
    /// Hard cap on total completed operations (successes + failures); `0` disables the budget.
    pub tx_budget: u64,
    /// Size of the keyspace, `[0, records)`.
    pub records: u64,
    /// Percentage of `records` to populate during an init-mode run, `[0, 100]`.
    pub init_pct: u8,
    /// Percentage of operations that are reads, `[0, 100]`.
    pub read_pct: u8,
    /// Keys per batch read; `1` disables batching. Writes are always single-key.
    pub batch_size: usize,
    /// Shape of the generated bin value.
    pub bin_type: BinType,
    /// Size in bytes/characters for `Str`/`Bytes` bin types.
    pub bin_size: usize,
    /// If true, one value is generated at startup and reused for every write.
    pub fixed_value: bool,
    /// Whether to record per-operation latency into the histogram.
    pub latency_enabled: bool,
    /// Number of histogram buckets, `[2, 10]`.
    pub latency_columns: usize,
    /// Geometric growth shift between buckets, `[1, 5]`.
    pub latency_shift: u8,
    /// Use the alternate histogram header formatting.
    pub alt_histogram: bool,
    /// Emit verbose per-failure diagnostics to stderr.
    pub debug: bool,
    /// Run seed for `FastRng::for_worker`; `None` seeds from the monotonic clock.
    pub seed: Option<u64>,
}

impl BenchmarkConfig {
    /// Validates the invariants named in the data model: `read_pct ∈ [0,100]`,
    /// `latency_columns ∈ [2,10]`, `latency_shift ∈ [1,5]`, plus the structural invariants a
    /// zero-sized config would otherwise violate downstream.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.read_pct > 100 {
            return Err(BenchError::ConfigInvalid {
                field: "read_pct",
                reason: "must be within [0, 100]".to_string(),
            });
        }
        if self.init_pct > 100 {
            return Err(BenchError::ConfigInvalid {
                field: "init_pct",
                reason: "must be within [0, 100]".to_string(),
            });
        }
        if !(2..=10).contains(&self.latency_columns) {
            return Err(BenchError::ConfigInvalid {
                field: "latency_columns",
                reason: "must be within [2, 10]".to_string(),
            });
        }
        if !(1..=5).contains(&self.latency_shift) {
            return Err(BenchError::ConfigInvalid {
                field: "latency_shift",
                reason: "must be within [1, 5]".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(BenchError::ConfigInvalid {
                field: "batch_size",
                reason: "must be >= 1 (1 disables batching)".to_string(),
            });
        }
        if self.worker_count == 0 {
            return Err(BenchError::ConfigInvalid {
                field: "worker_count",
                reason: "must be >= 1".to_string(),
            });
        }
        if self.mode == Mode::Async && self.in_flight_max == 0 {
            return Err(BenchError::ConfigInvalid {
                field: "in_flight_max",
                reason: "must be >= 1 in async mode".to_string(),
            });
        }
        if self.records == 0 {
            return Err(BenchError::ConfigInvalid {
                field: "records",
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }

    /// Number of records an init-mode run should populate.
    pub fn init_record_count(&self) -> u64 {
        self.records * u64::from(self.init_pct) / 100
    }
}
