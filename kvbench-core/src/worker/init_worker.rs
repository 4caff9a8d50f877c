//! # InitWorker
//!
//! Purpose: Populate a contiguous, disjoint slice of the keyspace once each, retrying a failed
//! key a bounded number of times before escalating to a fatal worker exit.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use kvbench_client::{Key, SyncDbClient, WritePolicy};
use kvbench_common::{BenchError, BenchmarkConfig, FastRng, ValueSource};
use kvbench_metrics::{ceil_ms, MetricsCore};

use crate::state::WorkerState;

const BIN_NAME: &str = "bin";

/// Retries a single key this many times before the worker escalates to a fatal exit.
pub const MAX_INIT_RETRIES: u32 = 5;

/// Populates `[key_start, key_start + key_count)`, in order, each key exactly once.
pub struct InitWorker<C: SyncDbClient + 'static> {
    id: usize,
    client: Arc<C>,
    config: Arc<BenchmarkConfig>,
    metrics: Arc<MetricsCore>,
    value_source: Arc<ValueSource>,
    state: WorkerState,
    run_seed: u64,
    key_start: u64,
    key_count: u64,
}

impl<C: SyncDbClient + 'static> InitWorker<C> {
    /// Builds a worker over the half-open key range `[key_start, key_start + key_count)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        client: Arc<C>,
        config: Arc<BenchmarkConfig>,
        metrics: Arc<MetricsCore>,
        value_source: Arc<ValueSource>,
        state: WorkerState,
        run_seed: u64,
        key_start: u64,
        key_count: u64,
    ) -> Self {
        InitWorker {
            id,
            client,
            config,
            metrics,
            value_source,
            state,
            run_seed,
            key_start,
            key_count,
        }
    }

    /// Spawns the worker thread. The join handle resolves to `Err(BenchError::WorkerFatal)` if a
    /// key exhausted its retry budget.
    pub fn spawn(self) -> JoinHandle<Result<(), BenchError>> {
        thread::Builder::new()
            .name(format!("kvbench-init-{}", self.id))
            .spawn(move || self.run())
            .expect("failed to spawn init worker thread")
    }

    fn run(self) -> Result<(), BenchError> {
        self.state.mark_running();
        let mut rng = FastRng::for_worker(self.run_seed, self.id);
        let mut value_buf = Vec::new();

        for offset in 0..self.key_count {
            if !self.state.is_valid() {
                break;
            }
            if let Err(reason) = self.populate_one(self.key_start + offset, &mut rng, &mut value_buf) {
                self.state.mark_stopping();
                self.state.mark_stopped();
                return Err(BenchError::WorkerFatal {
                    worker_id: self.id,
                    reason,
                });
            }
        }

        self.state.mark_stopping();
        self.state.mark_stopped();
        Ok(())
    }

    /// Writes one key, retrying on failure up to `MAX_INIT_RETRIES` times.
    fn populate_one(&self, index: u64, rng: &mut FastRng, value_buf: &mut Vec<u8>) -> Result<(), String> {
        let key = Key::from_index(index);
        let mut retries_left = MAX_INIT_RETRIES;

        loop {
            let value = self.value_source.next(rng);
            value_buf.clear();
            value.write_to_buffer(value_buf);

            let start = self.config.latency_enabled.then(Instant::now);
            match self.client.put(&WritePolicy::default(), &key, BIN_NAME, value_buf) {
                Ok(()) => {
                    match start {
                        Some(start) => self.metrics.record_success_with(ceil_ms(start.elapsed())),
                        None => self.metrics.record_success(),
                    }
                    return Ok(());
                }
                Err(err) => {
                    self.metrics.record_failure_debug(&err, self.config.debug);
                    if retries_left == 0 {
                        return Err(format!("exhausted retries on key {index}: {err}"));
                    }
                    retries_left -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbench_client::MockDbClient;
    use kvbench_common::{BinType, Mode};

    fn test_config() -> Arc<BenchmarkConfig> {
        Arc::new(BenchmarkConfig {
            hosts: "h".to_string(),
            namespace: "n".to_string(),
            set: "s".to_string(),
            mode: Mode::Sync,
            worker_count: 1,
            in_flight_max: 1,
            target_tps: 0,
            tx_budget: 0,
            records: 1000,
            init_pct: 100,
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
            seed: Some(11),
        })
    }

    #[test]
    fn populates_exactly_the_assigned_range() {
        let config = test_config();
        let client = Arc::new(MockDbClient::new());
        let metrics = MetricsCore::new(None);
        let mut rng = FastRng::for_worker(config.seed.unwrap(), 0);
        let value_source = Arc::new(ValueSource::new(&config, &mut rng));
        let worker = InitWorker::new(
            0,
            Arc::clone(&client),
            config,
            Arc::clone(&metrics),
            value_source,
            WorkerState::new(),
            11,
            250,
            250,
        );
        let handle = worker.spawn();
        handle.join().unwrap().unwrap();
        assert_eq!(metrics.total_count(), 250);

        for i in 250..500u64 {
            let got = client.get(&kvbench_client::ReadPolicy::default(), &Key::from_index(i), "bin").unwrap();
            assert!(got.is_some(), "key {i} should have been populated");
        }
        let missed = client
            .get(&kvbench_client::ReadPolicy::default(), &Key::from_index(10), "bin")
            .unwrap();
        assert!(missed.is_none());
    }

    #[test]
    fn exhausting_retries_escalates_to_worker_fatal() {
        let config = test_config();
        let client = Arc::new(MockDbClient::with_timeout_every(1));
        let metrics = MetricsCore::new(None);
        let mut rng = FastRng::for_worker(config.seed.unwrap(), 0);
        let value_source = Arc::new(ValueSource::new(&config, &mut rng));
        let worker = InitWorker::new(0, client, config, metrics, value_source, WorkerState::new(), 11, 0, 1);
        let handle = worker.spawn();
        let result = handle.join().unwrap();
        assert!(matches!(result, Err(BenchError::WorkerFatal { worker_id: 0, .. })));
    }
}
