//! # SyncWorker
//!
//! Purpose: One OS thread per worker, issuing blocking `DbClient` calls in a read/write mix per
//! `BenchmarkConfig::read_pct`, honoring an optional per-process throughput ceiling.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use kvbench_client::{BatchPolicy, Key, ReadPolicy, SyncDbClient, WritePolicy};
use kvbench_common::{BenchmarkConfig, ClientError, FastRng, ValueSource};
use kvbench_metrics::{ceil_ms, OpClass};

use crate::metrics::WorkloadMetrics;
use crate::state::WorkerState;

const BIN_NAME: &str = "bin";

/// One thread-backed worker running the mixed read/write loop.
pub struct SyncWorker<C: SyncDbClient + 'static> {
    id: usize,
    client: Arc<C>,
    config: Arc<BenchmarkConfig>,
    metrics: Arc<WorkloadMetrics>,
    value_source: Arc<ValueSource>,
    state: WorkerState,
    run_seed: u64,
}

impl<C: SyncDbClient + 'static> SyncWorker<C> {
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
        SyncWorker {
            id,
            client,
            config,
            metrics,
            value_source,
            state,
            run_seed,
        }
    }

    /// Spawns the worker thread and returns its join handle.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::Builder::new()
            .name(format!("kvbench-sync-{}", self.id))
            .spawn(move || self.run())
            .expect("failed to spawn sync worker thread")
    }

    fn run(self) {
        self.state.mark_running();
        let mut rng = FastRng::for_worker(self.run_seed, self.id);
        let mut key_buf = Vec::new();
        let mut value_buf = Vec::new();

        while self.state.is_valid() {
            self.issue_one(&mut rng, &mut key_buf, &mut value_buf);
            self.throttle_if_needed();
        }

        self.state.mark_stopping();
        self.state.mark_stopped();
    }

    fn issue_one(&self, rng: &mut FastRng, key_buf: &mut Vec<Key>, value_buf: &mut Vec<u8>) {
        let die = rng.next_range(0, 100);
        let timed = if die < i64::from(self.config.read_pct) {
            self.issue_read(rng, key_buf)
        } else {
            self.issue_write(rng, value_buf)
        };
        self.record(timed);
    }

    fn issue_read(&self, rng: &mut FastRng, key_buf: &mut Vec<Key>) -> TimedResult {
        let start = self.start_timer();
        let result = if self.config.batch_size > 1 {
            key_buf.clear();
            key_buf.extend((0..self.config.batch_size).map(|_| self.random_key(rng)));
            self.client
                .batch_get(&BatchPolicy::default(), key_buf.as_slice(), BIN_NAME)
                .map(|_| ())
        } else {
            let key = self.random_key(rng);
            self.client.get(&ReadPolicy::default(), &key, BIN_NAME).map(|_| ())
        };
        TimedResult {
            op: OpClass::Read,
            start,
            result,
        }
    }

    fn issue_write(&self, rng: &mut FastRng, value_buf: &mut Vec<u8>) -> TimedResult {
        let key = self.random_key(rng);
        let value = self.value_source.next(rng);
        value_buf.clear();
        value.write_to_buffer(value_buf);
        let start = self.start_timer();
        let result = self.client.put(&WritePolicy::default(), &key, BIN_NAME, value_buf);
        TimedResult {
            op: OpClass::Write,
            start,
            result,
        }
    }

    fn random_key(&self, rng: &mut FastRng) -> Key {
        Key::from_index(rng.next_range(0, self.config.records as i64) as u64)
    }

    fn start_timer(&self) -> Option<Instant> {
        self.config.latency_enabled.then(Instant::now)
    }

    fn record(&self, timed: TimedResult) {
        let core = match timed.op {
            OpClass::Read => &self.metrics.read,
            OpClass::Write => &self.metrics.write,
        };
        match timed.result {
            Ok(()) => match timed.start {
                Some(start) => core.record_success_with(ceil_ms(start.elapsed())),
                None => core.record_success(),
            },
            Err(err) => core.record_failure_debug(&err, self.config.debug),
        }
    }

    fn throttle_if_needed(&self) {
        if self.config.target_tps == 0 {
            return;
        }
        // Throttle against the combined rate; a single `target_tps` ceiling governs the whole
        // worker regardless of which op class it just issued.
        let period_count = self.metrics.read.period_count() + self.metrics.write.period_count();
        if period_count > self.config.target_tps {
            let into_period = self.metrics.write.app_elapsed_ms() % 1000;
            let remaining = 1000u64.saturating_sub(into_period);
            if remaining > 0 {
                thread::sleep(Duration::from_millis(remaining));
            }
            self.metrics.read.reset_period_count();
            self.metrics.write.reset_period_count();
        }
    }
}

struct TimedResult {
    op: OpClass,
    start: Option<Instant>,
    result: Result<(), ClientError>,
}
