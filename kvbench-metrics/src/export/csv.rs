//! Hand-formatted CSV sink. No `csv` crate dependency: the record shape is fixed and small
//! enough that manual formatting is clearer than pulling in a writer builder for it.

use std::io::Write;

use super::{format_app_elapsed, ExportSink, Sample};

/// Writes one CSV row per sample to any `std::io::Write` sink (a file, in practice).
pub struct CsvSink<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    /// Wraps `writer`; the header row is written lazily, on the first `record` call.
    pub fn new(writer: W) -> Self {
        CsvSink {
            writer,
            header_written: false,
        }
    }

    fn write_header(&mut self) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "sequence,app_elapsed,elapsed_ms,op_type,function_name,primary_key"
        )
    }
}

impl<W: Write + Send + Sync> ExportSink for CsvSink<W> {
    fn record(&mut self, sample: &Sample) {
        if !self.header_written {
            if self.write_header().is_err() {
                return;
            }
            self.header_written = true;
        }
        let _ = writeln!(
            self.writer,
            "{},{},{},{},{},{}",
            sample.sequence,
            format_app_elapsed(sample.app_elapsed_ms),
            sample.elapsed_ms,
            sample.op_type,
            sample.function_name,
            escape_field(&sample.primary_key),
        );
    }
}

/// Quotes a field if it contains a comma, quote, or newline, doubling embedded quotes.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sequence: u64, primary_key: &str) -> Sample {
        Sample {
            sequence,
            app_elapsed_ms: 1_500,
            elapsed_ms: 4,
            op_type: "read",
            function_name: "get",
            primary_key: primary_key.to_string(),
        }
    }

    #[test]
    fn writes_header_once_then_rows() {
        let mut buf = Vec::new();
        {
            let mut sink = CsvSink::new(&mut buf);
            sink.record(&sample(1, "key:1"));
            sink.record(&sample(2, "key:2"));
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "sequence,app_elapsed,elapsed_ms,op_type,function_name,primary_key");
        assert_eq!(lines.next().unwrap(), "1,00:00:01.5000000,4,read,get,key:1");
        assert_eq!(lines.next().unwrap(), "2,00:00:01.5000000,4,read,get,key:2");
        assert!(lines.next().is_none());
    }

    #[test]
    fn escapes_fields_with_commas_and_quotes() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("a\"b"), "\"a\"\"b\"");
    }
}
