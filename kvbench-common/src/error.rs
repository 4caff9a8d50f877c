//! # Benchmark Error Types
//!
//! ## Design Principles
//!
//! 1. **Categorized Variants**: Each variant names the failure it represents rather than
//!    wrapping an opaque string, so callers can match on intent.
//! 2. **Recoverability Hints**: `ClientError::is_timeout` lets callers route a failure to the
//!    right counter without re-deriving the category from a message string.
//! 3. **Never Fatal On The Hot Path**: `ClientError` is counted, not propagated; only
//!    `BenchError` ever leaves the core as a hard failure (construction-time validation,
//!    an unrecoverable worker, or reporter I/O).

use thiserror::Error;

/// Errors surfaced at the benchmark core boundary.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Config validation failed at construction; never recoverable.
    #[error("invalid config field `{field}`: {reason}")]
    ConfigInvalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the allowed range.
        reason: String,
    },

    /// A worker thread or task exited for a reason other than a normal stop.
    #[error("worker {worker_id} exited fatally: {reason}")]
    WorkerFatal {
        /// Index of the worker that died.
        worker_id: usize,
        /// Cause of the fatal exit.
        reason: String,
    },

    /// The reporter failed to write to its output sink.
    #[error("reporter I/O error: {0}")]
    ReporterIo(String),
}

/// Error surfaced by a single `DbClient` operation.
///
/// The core never inspects the payload beyond `is_timeout`; it only threads the error into
/// `MetricsCore::record_failure`.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The operation did not complete before the client's own deadline.
    #[error("operation timed out")]
    Timeout,
    /// Any other client-side failure.
    #[error("client error: {0}")]
    Other(String),
}

impl ClientError {
    /// Returns true if this failure should be counted as a timeout rather than a generic error.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout)
    }
}
