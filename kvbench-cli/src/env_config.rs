//! # Environment Configuration Loading
//!
//! Purpose: Build a `BenchmarkConfig` from `KVBENCH_*` environment variables, in the same
//! unadorned `std::env::var(...).unwrap_or_else(...)` idiom the teacher's own binary uses for
//! `HKV_ADDR`. No config-file parser, no CLI-argument-parsing crate.

use kvbench_common::{BenchError, BenchmarkConfig, BinType, Mode};

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_mode(default: Mode) -> Mode {
    match std::env::var("KVBENCH_MODE") {
        Ok(v) => match v.to_ascii_lowercase().as_str() {
            "sync" => Mode::Sync,
            "async" => Mode::Async,
            other => {
                tracing::warn!(value = %other, "unrecognized KVBENCH_MODE, falling back to default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_bin_type(default: BinType) -> BinType {
    match std::env::var("KVBENCH_BIN_TYPE") {
        Ok(v) => match v.to_ascii_lowercase().as_str() {
            "int" => BinType::Int,
            "str" => BinType::Str,
            "bytes" => BinType::Bytes,
            other => {
                tracing::warn!(value = %other, "unrecognized KVBENCH_BIN_TYPE, falling back to default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Builds and validates a `BenchmarkConfig` from the process environment.
pub fn from_env() -> Result<BenchmarkConfig, BenchError> {
    let config = BenchmarkConfig {
        hosts: env_string("KVBENCH_HOSTS", "127.0.0.1:3000"),
        namespace: env_string("KVBENCH_NAMESPACE", "test"),
        set: env_string("KVBENCH_SET", "bench"),
        mode: env_mode(Mode::Sync),
        worker_count: env_parse("KVBENCH_WORKERS", 4usize),
        in_flight_max: env_parse("KVBENCH_IN_FLIGHT_MAX", 16usize),
        target_tps: env_parse("KVBENCH_TARGET_TPS", 0u64),
        tx_budget: env_parse("KVBENCH_TX_BUDGET", 0u64),
        records: env_parse("KVBENCH_RECORDS", 100_000u64),
        init_pct: env_parse("KVBENCH_INIT_PCT", 0u8),
        read_pct: env_parse("KVBENCH_READ_PCT", 50u8),
        batch_size: env_parse("KVBENCH_BATCH_SIZE", 1usize),
        bin_type: env_bin_type(BinType::Int),
        bin_size: env_parse("KVBENCH_BIN_SIZE", 16usize),
        fixed_value: env_bool("KVBENCH_FIXED_VALUE", false),
        latency_enabled: env_bool("KVBENCH_LATENCY", true),
        latency_columns: env_parse("KVBENCH_LATENCY_COLUMNS", 7usize),
        latency_shift: env_parse("KVBENCH_LATENCY_SHIFT", 1u8),
        alt_histogram: env_bool("KVBENCH_ALT_HISTOGRAM", false),
        debug: env_bool("KVBENCH_DEBUG", false),
        seed: std::env::var("KVBENCH_SEED").ok().and_then(|v| v.parse().ok()),
    };
    config.validate()?;
    Ok(config)
}
