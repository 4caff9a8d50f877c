//! # Export Sinks
//!
//! Purpose: Optional CSV/JSON dump of raw per-operation samples. Not required for conformance —
//! disabled by default, and sample recording is gated so it never runs on the hot path unless a
//! sink is attached.
//!
//! ## Design Principles
//! 1. **Opt-In Cost**: `ExportSink::record` is only ever called when a sink exists; no sampling
//!    overhead otherwise.
//! 2. **Locale-Independent Timestamps**: `hh:mm:ss.sssssss`, always, everywhere — never a
//!    localized or system-default format.

pub mod csv;
pub mod json;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;

/// One raw per-operation sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Monotonically increasing sample sequence number.
    pub sequence: u64,
    /// Milliseconds since the benchmark run started.
    pub app_elapsed_ms: u64,
    /// Operation latency in milliseconds.
    pub elapsed_ms: u64,
    /// `"read"`, `"write"`, or `"batch_read"`.
    pub op_type: &'static str,
    /// Name of the client function invoked (`"get"`, `"put"`, `"batch_get"`).
    pub function_name: &'static str,
    /// Primary key touched, formatted as UTF-8-lossy text.
    pub primary_key: String,
}

/// A sink that can record raw samples as they are produced.
pub trait ExportSink: Send + Sync {
    /// Records one sample. Implementations must not panic on a malformed sample; this is a
    /// best-effort diagnostic feature, not a correctness-critical path.
    fn record(&mut self, sample: &Sample);
}

/// Formats an elapsed-since-start duration as `hh:mm:ss.sssssss`, matching the spec's
/// locale-independent timestamp format for export sinks.
pub fn format_app_elapsed(app_elapsed_ms: u64) -> String {
    let total_ms = app_elapsed_ms;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let fractional_ticks = (total_ms % 1000) * 10_000; // scale ms -> 7 fractional digits
    format!("{hours:02}:{minutes:02}:{seconds:02}.{fractional_ticks:07}")
}
