//! Metrics core: latency histograms, period/cumulative counters, the live reporter, and
//! optional raw-sample export sinks.

pub mod counters;
pub mod export;
pub mod histogram;
pub mod reporter;

pub use counters::{MetricsCore, PeriodCounters};
pub use export::{CsvSink, ExportSink, JsonSink, Sample};
pub use histogram::{ceil_ms, AltHistogram, LatencyHistogram};
pub use reporter::{OpClass, Reporter};
