//! Integration coverage across `BenchmarkConfig`, `FastRng`, and `ValueSource` together, since
//! the inline unit tests in each module exercise them in isolation.

use kvbench_common::{BenchmarkConfig, BinType, FastRng, Mode, ValueSource};

fn config(bin_type: BinType, fixed_value: bool) -> BenchmarkConfig {
    BenchmarkConfig {
        hosts: "127.0.0.1:3000".to_string(),
        namespace: "test".to_string(),
        set: "bench".to_string(),
        mode: Mode::Sync,
        worker_count: 4,
        in_flight_max: 1,
        target_tps: 0,
        tx_budget: 0,
        records: 5000,
        init_pct: 100,
        read_pct: 0,
        batch_size: 1,
        bin_type,
        bin_size: 24,
        fixed_value,
        latency_enabled: false,
        latency_columns: 7,
        latency_shift: 1,
        alt_histogram: false,
        debug: false,
        seed: Some(99),
    }
}

#[test]
fn a_validated_config_feeds_per_worker_rng_streams_that_stay_in_bounds() {
    let cfg = config(BinType::Int, false);
    cfg.validate().unwrap();

    for worker_index in 0..cfg.worker_count {
        let mut rng = FastRng::for_worker(cfg.seed.unwrap(), worker_index);
        for _ in 0..1000 {
            let key = rng.next_range(0, cfg.records as i64);
            assert!((0..cfg.records as i64).contains(&key));
        }
    }
}

#[test]
fn fixed_value_source_survives_config_driven_construction() {
    let cfg = config(BinType::Str, true);
    let mut rng = FastRng::for_worker(cfg.seed.unwrap(), 0);
    let source = ValueSource::new(&cfg, &mut rng);

    let mut buf = Vec::new();
    let first = source.next(&mut rng);
    first.write_to_buffer(&mut buf);
    assert_eq!(buf.len(), cfg.bin_size);

    buf.clear();
    let second = source.next(&mut rng);
    second.write_to_buffer(&mut buf);
    assert_eq!(first, second);
}

#[test]
fn per_call_bytes_source_produces_distinct_values_across_the_keyspace() {
    let cfg = config(BinType::Bytes, false);
    let mut rng = FastRng::for_worker(cfg.seed.unwrap(), 0);
    let source = ValueSource::new(&cfg, &mut rng);

    let a = source.next(&mut rng);
    let b = source.next(&mut rng);
    assert_ne!(a, b);
}

#[test]
fn init_record_count_matches_the_keyspace_for_a_full_population_run() {
    let cfg = config(BinType::Int, false);
    assert_eq!(cfg.init_record_count(), cfg.records);
}
