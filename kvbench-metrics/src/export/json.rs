//! `serde_json`-backed sink: one JSON object per line (JSON Lines), so a partially-written file
//! is still parseable up to its last complete line.

use std::io::Write;

use serde::Serialize;

use super::{format_app_elapsed, ExportSink, Sample};

#[derive(Serialize)]
struct JsonRecord<'a> {
    sequence: u64,
    app_elapsed: String,
    elapsed_ms: u64,
    op_type: &'a str,
    function_name: &'a str,
    primary_key: &'a str,
}

/// Writes one JSON object per line to any `std::io::Write` sink.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        JsonSink { writer }
    }
}

impl<W: Write + Send + Sync> ExportSink for JsonSink<W> {
    fn record(&mut self, sample: &Sample) {
        let record = JsonRecord {
            sequence: sample.sequence,
            app_elapsed: format_app_elapsed(sample.app_elapsed_ms),
            elapsed_ms: sample.elapsed_ms,
            op_type: sample.op_type,
            function_name: sample.function_name,
            primary_key: &sample.primary_key,
        };
        if let Ok(line) = serde_json::to_string(&record) {
            let _ = writeln!(self.writer, "{line}");
        }
    }
}
