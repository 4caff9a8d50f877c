//! End-to-end scenario tests against the reference in-memory `DbClient`s, matching the
//! concrete scenarios worked through during design: init population, budget-bounded pure
//! reads, batched-read counting, fixed-value identity, timeout forward progress, and
//! budget-triggered shutdown timing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kvbench_client::{MockAsyncDbClient, MockDbClient};
use kvbench_common::{BenchmarkConfig, BinType, Mode};
use kvbench_core::{Orchestrator, WorkerStatus};

fn base_config() -> BenchmarkConfig {
    BenchmarkConfig {
        hosts: "127.0.0.1:3000".to_string(),
        namespace: "test".to_string(),
        set: "bench".to_string(),
        mode: Mode::Sync,
        worker_count: 4,
        in_flight_max: 8,
        target_tps: 0,
        tx_budget: 0,
        records: 1000,
        init_pct: 0,
        read_pct: 0,
        batch_size: 1,
        bin_type: BinType::Int,
        bin_size: 16,
        fixed_value: false,
        latency_enabled: false,
        latency_columns: 7,
        latency_shift: 1,
        alt_histogram: false,
        debug: false,
        seed: Some(123),
    }
}

#[tokio::test]
async fn init_populates_1000_keys_across_4_workers() {
    let mut config = base_config();
    config.records = 1000;
    config.init_pct = 100;
    config.worker_count = 4;

    let orchestrator = Orchestrator::new(config).unwrap();
    let client = Arc::new(MockDbClient::new());
    orchestrator.run_init(Arc::clone(&client)).await.unwrap();

    assert_eq!(orchestrator.metrics().write.total_count(), 1000);
    for i in 0..1000u64 {
        let got = client
            .get(&kvbench_client::ReadPolicy::default(), &kvbench_client::Key::from_index(i), "bin")
            .unwrap();
        assert!(got.is_some(), "key {i} should have been populated by init");
    }
}

#[tokio::test]
async fn pure_reads_stop_at_budget_and_write_counter_stays_zero() {
    let mut config = base_config();
    config.records = 10_000;
    config.read_pct = 100;
    config.batch_size = 1;
    config.worker_count = 2;
    config.tx_budget = 500;
    config.latency_enabled = true;
    config.latency_columns = 7;
    config.latency_shift = 1;

    let orchestrator = Orchestrator::new(config).unwrap();
    let client = Arc::new(MockDbClient::new());
    orchestrator.run_sync(client, std::future::pending()).await.unwrap();

    assert!(orchestrator.metrics().read.total_count() >= 500);
    assert_eq!(orchestrator.metrics().write.total_count(), 0);
    let hist = orchestrator.metrics().read.histogram().unwrap();
    let sum: u64 = (0..hist.columns()).map(|i| hist.bucket(i)).sum();
    assert_eq!(sum, orchestrator.metrics().read.total_count());
}

#[tokio::test]
async fn batched_reads_count_once_per_batch_not_per_key() {
    let mut config = base_config();
    config.records = 10_000;
    config.read_pct = 100;
    config.batch_size = 10;
    config.worker_count = 1;
    config.tx_budget = 50;

    let orchestrator = Orchestrator::new(config).unwrap();
    let client = Arc::new(MockDbClient::new());
    orchestrator.run_sync(client, std::future::pending()).await.unwrap();

    // Each completed operation is one batch of 10 keys; the counter tracks operations, not keys.
    assert!(orchestrator.metrics().read.total_count() >= 50);
}

#[tokio::test]
async fn fixed_value_writes_are_identical_every_time() {
    let mut config = base_config();
    config.records = 50;
    config.init_pct = 100;
    config.worker_count = 1;
    config.bin_type = BinType::Str;
    config.bin_size = 32;
    config.fixed_value = true;

    let orchestrator = Orchestrator::new(config).unwrap();
    let client = Arc::new(MockDbClient::new());
    orchestrator.run_init(Arc::clone(&client)).await.unwrap();

    let first = client
        .get(&kvbench_client::ReadPolicy::default(), &kvbench_client::Key::from_index(0), "bin")
        .unwrap()
        .unwrap();
    let second = client
        .get(&kvbench_client::ReadPolicy::default(), &kvbench_client::Key::from_index(1), "bin")
        .unwrap()
        .unwrap();
    assert_eq!(first.bin, second.bin);
    assert_eq!(first.bin.len(), 32);
}

#[tokio::test]
async fn timeouts_on_every_other_call_still_make_forward_progress() {
    let mut config = base_config();
    config.records = 1000;
    config.read_pct = 0;
    config.worker_count = 2;
    config.tx_budget = 200;

    let orchestrator = Orchestrator::new(config).unwrap();
    let client = Arc::new(MockDbClient::with_timeout_every(2));
    orchestrator.run_sync(client, std::future::pending()).await.unwrap();

    let total = orchestrator.metrics().write.total_count();
    let failures = orchestrator.metrics().write.total_failures();
    assert!(total >= 200);
    assert!(failures > 0, "half the calls should have timed out");
    let ratio = failures as f64 / (total + failures) as f64;
    assert!((0.3..0.7).contains(&ratio), "timeout ratio {ratio} should be roughly half");
}

#[tokio::test]
async fn budget_shutdown_quiesces_every_worker_promptly() {
    let mut config = base_config();
    config.records = 10_000;
    config.read_pct = 50;
    config.worker_count = 8;
    config.tx_budget = 100;
    config.mode = Mode::Async;
    config.in_flight_max = 4;

    let orchestrator = Orchestrator::new(config).unwrap();
    let client = Arc::new(MockAsyncDbClient::new());

    let start = Instant::now();
    orchestrator.run_async(client, std::future::pending()).await.unwrap();
    let elapsed = start.elapsed();

    assert!(orchestrator.metrics().total_count() + orchestrator.metrics().total_failures() >= 100);
    assert!(elapsed < Duration::from_secs(2), "shutdown should quiesce promptly, took {elapsed:?}");
}

#[test]
fn worker_status_reaches_stopped_after_a_bounded_sync_run() {
    use kvbench_core::WorkerState;

    let state = WorkerState::new();
    state.mark_running();
    assert_eq!(state.status(), WorkerStatus::Running);
    state.request_stop();
    state.mark_stopping();
    state.mark_stopped();
    assert_eq!(state.status(), WorkerStatus::Stopped);
}
