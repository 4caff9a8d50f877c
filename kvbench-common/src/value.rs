//! # ValueSource
//!
//! Purpose: Produce the bin payload a worker writes, according to `BenchmarkConfig::bin_type`
//! and `fixed_value`.
//!
//! ## Design Principles
//! 1. **Dynamic "Value" Polymorphism Becomes A Tagged Variant**: `BinValue` is a small closed
//!    enum with one `write_to_buffer` operation; callers never match on the variant themselves.
//! 2. **One RNG Draw For Fixed Values**: `fixed_value=true` spends exactly one draw at startup
//!    and then returns the same value by reference forever after.

use crate::config::{BenchmarkConfig, BinType};
use crate::rng::FastRng;

/// A generated bin payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinValue {
    /// Integer payload.
    Int(i64),
    /// Printable-ASCII string payload.
    Str(String),
    /// Raw byte payload.
    Bytes(Vec<u8>),
}

impl BinValue {
    /// Appends this value's bytes to `out`. Callers never need to inspect the variant beyond
    /// construction; this is the single operation every caller needs.
    pub fn write_to_buffer(&self, out: &mut Vec<u8>) {
        match self {
            BinValue::Int(v) => out.extend_from_slice(&v.to_le_bytes()),
            BinValue::Str(s) => out.extend_from_slice(s.as_bytes()),
            BinValue::Bytes(b) => out.extend_from_slice(b),
        }
    }
}

fn generate(bin_type: BinType, bin_size: usize, rng: &mut FastRng) -> BinValue {
    match bin_type {
        BinType::Int => BinValue::Int(rng.next()),
        BinType::Str => {
            let mut bytes = vec![0u8; bin_size];
            for b in &mut bytes {
                *b = rng.next_printable_ascii();
            }
            // Generation only ever draws printable ASCII, so this is always valid UTF-8.
            BinValue::Str(String::from_utf8(bytes).expect("printable ASCII is valid UTF-8"))
        }
        BinType::Bytes => {
            let mut bytes = vec![0u8; bin_size];
            rng.next_bytes(&mut bytes);
            BinValue::Bytes(bytes)
        }
    }
}

/// Produces bin values for a worker, honoring `fixed_value`.
pub enum ValueSource {
    /// A single value generated once, returned by reference on every call.
    Fixed(BinValue),
    /// A fresh value generated per call from the caller's RNG.
    PerCall { bin_type: BinType, bin_size: usize },
}

impl ValueSource {
    /// Builds a `ValueSource` from config, drawing the one startup value immediately if
    /// `fixed_value` is set.
    pub fn new(config: &BenchmarkConfig, rng: &mut FastRng) -> Self {
        if config.fixed_value {
            ValueSource::Fixed(generate(config.bin_type, config.bin_size, rng))
        } else {
            ValueSource::PerCall {
                bin_type: config.bin_type,
                bin_size: config.bin_size,
            }
        }
    }

    /// Returns the next bin value, generating one if this source is per-call.
    pub fn next(&self, rng: &mut FastRng) -> BinValue {
        match self {
            ValueSource::Fixed(v) => v.clone(),
            ValueSource::PerCall { bin_type, bin_size } => generate(*bin_type, *bin_size, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    fn base_config(bin_type: BinType, fixed_value: bool) -> BenchmarkConfig {
        BenchmarkConfig {
            hosts: "h".to_string(),
            namespace: "n".to_string(),
            set: "s".to_string(),
            mode: Mode::Sync,
            worker_count: 1,
            in_flight_max: 1,
            target_tps: 0,
            tx_budget: 0,
            records: 10,
            init_pct: 0,
            read_pct: 0,
            batch_size: 1,
            bin_type,
            bin_size: 32,
            fixed_value,
            latency_enabled: false,
            latency_columns: 7,
            latency_shift: 1,
            alt_histogram: false,
            debug: false,
            seed: Some(1),
        }
    }

    #[test]
    fn int_bin_produces_integers() {
        let cfg = base_config(BinType::Int, false);
        let mut rng = FastRng::new(1);
        let source = ValueSource::new(&cfg, &mut rng);
        assert!(matches!(source.next(&mut rng), BinValue::Int(_)));
    }

    #[test]
    fn str_bin_has_requested_length() {
        let cfg = base_config(BinType::Str, false);
        let mut rng = FastRng::new(2);
        let source = ValueSource::new(&cfg, &mut rng);
        match source.next(&mut rng) {
            BinValue::Str(s) => {
                assert_eq!(s.len(), 32);
                assert!(s.bytes().all(|b| (33..127).contains(&b)));
            }
            other => panic!("expected Str, got {other:?}"),
        }
    }

    #[test]
    fn bytes_bin_has_requested_length() {
        let cfg = base_config(BinType::Bytes, false);
        let mut rng = FastRng::new(3);
        let source = ValueSource::new(&cfg, &mut rng);
        match source.next(&mut rng) {
            BinValue::Bytes(b) => assert_eq!(b.len(), 32),
            other => panic!("expected Bytes, got {other:?}"),
        }
    }

    #[test]
    fn fixed_value_is_stable_across_calls() {
        let cfg = base_config(BinType::Str, true);
        let mut rng = FastRng::new(4);
        let source = ValueSource::new(&cfg, &mut rng);
        let first = source.next(&mut rng);
        let second = source.next(&mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn per_call_value_changes_across_calls() {
        let cfg = base_config(BinType::Bytes, false);
        let mut rng = FastRng::new(5);
        let source = ValueSource::new(&cfg, &mut rng);
        let first = source.next(&mut rng);
        let second = source.next(&mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn write_to_buffer_appends_bytes() {
        let value = BinValue::Int(42);
        let mut buf = Vec::new();
        value.write_to_buffer(&mut buf);
        assert_eq!(buf, 42i64.to_le_bytes().to_vec());
    }
}
