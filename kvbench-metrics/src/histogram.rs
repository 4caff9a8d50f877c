//! # LatencyHistogram
//!
//! Purpose: Fixed-shape logarithmic bucket counter for per-operation latency.
//!
//! ## Design Principles
//! 1. **Fixed Fast-Path Prefix**: Buckets 0 (`<=1ms`) and 1 (`>1ms`) are stable irrespective of
//!    `shift`, giving a consistent fast-path indicator across configurations.
//! 2. **Geometric Tail**: Buckets from index 2 onward grow by `2^shift` so a handful of columns
//!    spans milliseconds to seconds.
//! 3. **Accumulator Pattern**: Atomic bucket counters, no reset; cumulative across the run.
//! 4. **Zero-Cost Access**: Snapshots are plain `Vec<u64>` copies without heap churn on the hot
//!    path — only the one atomic fetch-add per `add` call.

use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-shape logarithmic latency histogram.
///
/// Bucket 0 counts `elapsed_ms <= 1`. Bucket 1 counts `elapsed_ms <= 1 << shift` (and `> 1`).
/// Bucket `k >= 2` counts values in `(limit_{k-1}, limit_k]` where
/// `limit_k = 2^{(k-1)*shift}` ms. The last bucket is inclusive-open and catches all overflow.
/// Indexing never fails: values beyond the last finite limit saturate into the last bucket.
pub struct LatencyHistogram {
    buckets: Vec<AtomicU64>,
    shift: u8,
}

impl LatencyHistogram {
    /// Creates a histogram with `columns` buckets (`2..=10`) and geometric `shift` (`1..=5`).
    ///
    /// Callers are expected to have already validated these bounds via
    /// `BenchmarkConfig::validate`; this constructor does not re-check them.
    pub fn new(columns: usize, shift: u8) -> Self {
        let mut buckets = Vec::with_capacity(columns);
        for _ in 0..columns {
            buckets.push(AtomicU64::new(0));
        }
        LatencyHistogram { buckets, shift }
    }

    /// Computes the bucket index for a ceiling-rounded millisecond elapsed value. Pure and
    /// side-effect free.
    pub fn bucket_index(&self, elapsed_ms: u64) -> usize {
        bucket_index_for(elapsed_ms, self.buckets.len(), self.shift)
    }

    /// Records one sample. The only side effect is the single atomic fetch-add on the selected
    /// bucket.
    pub fn add(&self, elapsed_ms: u64) {
        let idx = self.bucket_index(elapsed_ms);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the cumulative count for bucket `i`.
    pub fn bucket(&self, i: usize) -> u64 {
        self.buckets[i].load(Ordering::Relaxed)
    }

    /// Number of buckets.
    pub fn columns(&self) -> usize {
        self.buckets.len()
    }

    /// The geometric shift this histogram was constructed with.
    pub fn shift(&self) -> u8 {
        self.shift
    }

    /// Snapshot of all bucket counts, in order.
    pub fn snapshot(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.load(Ordering::Relaxed)).collect()
    }

    /// Upper bound (inclusive) of bucket `i`, or `None` for the last (overflow) bucket.
    pub fn bucket_limit_ms(&self, i: usize) -> Option<u64> {
        bucket_limit_ms(i, self.buckets.len(), self.shift)
    }

    /// Human-readable header for bucket `i`, e.g. `<=1ms`, `>1ms`, `>4ms`.
    pub fn bucket_header(&self, i: usize) -> String {
        match i {
            0 => "<=1ms".to_string(),
            1 => ">1ms".to_string(),
            _ => {
                // i-1 is always < columns-1 here, so this never falls back to None.
                let limit = bucket_limit_ms(i - 1, self.buckets.len(), self.shift).unwrap_or(1);
                format!(">{limit}ms")
            }
        }
    }

    /// Header for bucket `i` in either formatting style, so a caller holding a single
    /// `LatencyHistogram` can print either table without maintaining a second set of counters.
    pub fn header(&self, i: usize, alt: bool) -> String {
        if alt {
            alt_bucket_header(i, self.buckets.len(), self.shift)
        } else {
            self.bucket_header(i)
        }
    }
}

/// Standalone alternate-style header, spelling out the exact millisecond boundary rather than
/// the `<=`/`>` shorthand. Shared by `AltHistogram` and `LatencyHistogram::header`.
fn alt_bucket_header(i: usize, columns: usize, shift: u8) -> String {
    match bucket_limit_ms(i, columns, shift) {
        Some(limit) => {
            let prev = if i == 0 { 0 } else { bucket_limit_ms(i - 1, columns, shift).unwrap_or(0) };
            format!("{}-{}ms", prev + 1, limit)
        }
        None => {
            let prev = bucket_limit_ms(columns.saturating_sub(2), columns, shift).unwrap_or(0);
            format!("{}ms+", prev + 1)
        }
    }
}

fn bucket_limit_ms(i: usize, columns: usize, shift: u8) -> Option<u64> {
    // limit_k = 2^((k-1)*shift) for k >= 1 (1-indexed per the spec's own recurrence); bucket 1
    // (0-indexed) corresponds to k=1 with limit 2^0 = 1<<shift... we compute directly via the
    // same scan `add` uses so the two can never drift apart.
    if i >= columns - 1 {
        return None;
    }
    if i == 0 {
        return Some(1);
    }
    let mut limit: u64 = 1;
    for _ in 0..i {
        limit <<= shift;
    }
    Some(limit)
}

/// Standalone bucket-index computation, shared by `LatencyHistogram` and `AltHistogram` so the
/// two never disagree on bucketing semantics.
pub fn bucket_index_for(elapsed_ms: u64, columns: usize, shift: u8) -> usize {
    if elapsed_ms <= 1 {
        return 0;
    }
    let mut limit: u64 = 1;
    for i in 0..columns - 1 {
        if elapsed_ms <= limit {
            return i;
        }
        limit <<= shift;
    }
    columns - 1
}

/// Rounds a `std::time::Duration` up to the nearest whole millisecond, per the spec's "ceiling
/// to nearest millisecond" rounding rule.
pub fn ceil_ms(elapsed: std::time::Duration) -> u64 {
    let nanos = elapsed.as_nanos();
    nanos.div_ceil(1_000_000) as u64
}

/// Same buckets, same semantics, alternate header formatting: spells out the exact millisecond
/// boundary for every bucket instead of the `<=`/`>` shorthand.
pub struct AltHistogram {
    inner: LatencyHistogram,
}

impl AltHistogram {
    /// Creates an alternate-formatted histogram with the same bucketing as `LatencyHistogram`.
    pub fn new(columns: usize, shift: u8) -> Self {
        AltHistogram {
            inner: LatencyHistogram::new(columns, shift),
        }
    }

    /// Records one sample.
    pub fn add(&self, elapsed_ms: u64) {
        self.inner.add(elapsed_ms);
    }

    /// Returns the cumulative count for bucket `i`.
    pub fn bucket(&self, i: usize) -> u64 {
        self.inner.bucket(i)
    }

    /// Number of buckets.
    pub fn columns(&self) -> usize {
        self.inner.columns()
    }

    /// Snapshot of all bucket counts, in order.
    pub fn snapshot(&self) -> Vec<u64> {
        self.inner.snapshot()
    }

    /// Header for bucket `i`, spelling out the boundary value (e.g. `0-1ms`, `2-4ms`, `5ms+`).
    pub fn bucket_header(&self, i: usize) -> String {
        self.inner.header(i, true)
    }
}
