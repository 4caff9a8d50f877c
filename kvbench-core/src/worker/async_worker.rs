//! # AsyncWorker
//!
//! Purpose: A cooperative worker built from `in_flight_max` independent tokio task "slots". Each
//! slot awaits one operation, records it, checks the shared stop flag, and awaits the next —
//! `.await` on the client call *is* the suspension point, with no boxed futures and no callback
//! registration involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use kvbench_client::{AsyncDbClient, BatchPolicy, Key, ReadPolicy, WritePolicy};
use kvbench_common::{BenchmarkConfig, ClientError, FastRng, ValueSource};
use kvbench_metrics::{ceil_ms, OpClass};

use crate::metrics::WorkloadMetrics;
use crate::state::WorkerState;

const BIN_NAME: &str = "bin";

/// A worker realized as `in_flight_max` concurrent tokio task slots.
pub struct AsyncWorker<C: AsyncDbClient + 'static> {
    id: usize,
    client: Arc<C>,
    config: Arc<BenchmarkConfig>,
    metrics: Arc<WorkloadMetrics>,
    value_source: Arc<ValueSource>,
    state: WorkerState,
    run_seed: u64,
}

impl<C: AsyncDbClient + 'static> AsyncWorker<C> {
    /// Builds a worker; nothing runs until `spawn` is called.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        client: Arc<C>,
        config: Arc<BenchmarkConfig>,
        metrics: Arc<WorkloadMetrics>,
        value_source: Arc<ValueSource>,
        state: WorkerState,
        run_seed: u64,
    ) -> Self {
        AsyncWorker {
            id,
            client,
            config,
            metrics,
            value_source,
            state,
            run_seed,
        }
    }

    /// Spawns one tokio task per in-flight slot and returns their join handles. The worker's
    /// state transitions to `Stopped` only once every slot has exited.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        self.state.mark_running();
        let slot_count = self.config.in_flight_max.max(1);
        let remaining = Arc::new(AtomicUsize::new(slot_count));

        (0..slot_count)
            .map(|slot| {
                let client = Arc::clone(&self.client);
                let config = Arc::clone(&self.config);
                let metrics = Arc::clone(&self.metrics);
                let value_source = Arc::clone(&self.value_source);
                let state = self.state.clone();
                let remaining = Arc::clone(&remaining);
                let rng = FastRng::for_worker(self.run_seed, self.id * 10_000 + slot);
                tokio::spawn(run_slot(client, config, metrics, value_source, state, remaining, rng))
            })
            .collect()
    }
}

async fn run_slot<C: AsyncDbClient>(
    client: Arc<C>,
    config: Arc<BenchmarkConfig>,
    metrics: Arc<WorkloadMetrics>,
    value_source: Arc<ValueSource>,
    state: WorkerState,
    remaining: Arc<AtomicUsize>,
    mut rng: FastRng,
) {
    let mut key_buf = Vec::new();
    let mut value_buf = Vec::new();

    while state.is_valid() {
        issue_one(&client, &config, &metrics, &value_source, &mut rng, &mut key_buf, &mut value_buf).await;
    }

    if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
        state.mark_stopping();
        state.mark_stopped();
    }
}

async fn issue_one<C: AsyncDbClient>(
    client: &C,
    config: &BenchmarkConfig,
    metrics: &WorkloadMetrics,
    value_source: &ValueSource,
    rng: &mut FastRng,
    key_buf: &mut Vec<Key>,
    value_buf: &mut Vec<u8>,
) {
    let die = rng.next_range(0, 100);
    let start = config.latency_enabled.then(Instant::now);

    let (op, result): (OpClass, Result<(), ClientError>) = if die < i64::from(config.read_pct) {
        let result = if config.batch_size > 1 {
            key_buf.clear();
            key_buf.extend((0..config.batch_size).map(|_| random_key(config, rng)));
            client
                .batch_get(&BatchPolicy::default(), key_buf.as_slice(), BIN_NAME)
                .await
                .map(|_| ())
        } else {
            let key = random_key(config, rng);
            client.get(&ReadPolicy::default(), &key, BIN_NAME).await.map(|_| ())
        };
        (OpClass::Read, result)
    } else {
        let key = random_key(config, rng);
        let value = value_source.next(rng);
        value_buf.clear();
        value.write_to_buffer(value_buf);
        let result = client.put(&WritePolicy::default(), &key, BIN_NAME, value_buf).await;
        (OpClass::Write, result)
    };

    let core = match op {
        OpClass::Read => &metrics.read,
        OpClass::Write => &metrics.write,
    };
    match result {
        Ok(()) => match start {
            Some(start) => core.record_success_with(ceil_ms(start.elapsed())),
            None => core.record_success(),
        },
        Err(err) => core.record_failure_debug(&err, config.debug),
    }
}

fn random_key(config: &BenchmarkConfig, rng: &mut FastRng) -> Key {
    Key::from_index(rng.next_range(0, config.records as i64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbench_client::MockAsyncDbClient;
    use kvbench_common::{BinType, Mode};

    fn test_config(read_pct: u8, in_flight_max: usize) -> Arc<BenchmarkConfig> {
        Arc::new(BenchmarkConfig {
            hosts: "h".to_string(),
            namespace: "n".to_string(),
            set: "s".to_string(),
            mode: Mode::Async,
            worker_count: 1,
            in_flight_max,
            target_tps: 0,
            tx_budget: 0,
            records: 50,
            init_pct: 0,
            read_pct,
            batch_size: 1,
            bin_type: BinType::Int,
            bin_size: 16,
            fixed_value: false,
            latency_enabled: true,
            latency_columns: 7,
            latency_shift: 1,
            alt_histogram: false,
            debug: false,
            seed: Some(3),
        })
    }

    #[tokio::test]
    async fn slots_all_stop_and_mark_the_worker_stopped() {
        let config = test_config(50, 4);
        let client = Arc::new(MockAsyncDbClient::new());
        let metrics = Arc::new(WorkloadMetrics::new(&config));
        let mut seed_rng = FastRng::for_worker(config.seed.unwrap(), 0);
        let value_source = Arc::new(ValueSource::new(&config, &mut seed_rng));
        let state = WorkerState::new();
        let worker = AsyncWorker::new(0, client, config, metrics, value_source, state.clone(), 3);

        state.request_stop();
        let handles = worker.spawn();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(state.status(), crate::state::WorkerStatus::Stopped);
    }

    #[tokio::test]
    async fn issuing_operations_feeds_the_matching_series() {
        let config = test_config(0, 1);
        let client = Arc::new(MockAsyncDbClient::new());
        let metrics = WorkloadMetrics::new(&config);
        let mut rng = FastRng::for_worker(config.seed.unwrap(), 0);
        let value_source = Arc::new(ValueSource::new(&config, &mut rng));
        let mut key_buf = Vec::new();
        let mut value_buf = Vec::new();

        for _ in 0..5 {
            issue_one(&*client, &config, &metrics, &value_source, &mut rng, &mut key_buf, &mut value_buf).await;
        }
        assert_eq!(metrics.write.total_count(), 5);
        assert_eq!(metrics.read.total_count(), 0);
    }
}
