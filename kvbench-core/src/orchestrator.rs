//! # Orchestrator
//!
//! Purpose: Validate configuration, partition the keyspace for init-mode runs, build the shared
//! metrics cores and reporters, start workers, and enforce the transaction budget and shutdown
//! sequencing.
//!
//! ## Design Principles
//! 1. **Fail Fast On Config**: `Orchestrator::new` runs `BenchmarkConfig::validate` before
//!    anything else is built.
//! 2. **Shutdown Is Cooperative**: workers observe a shared `valid` flag; the orchestrator never
//!    kills a thread or aborts a task, it only waits for quiescence.
//! 3. **Budget And External Stop Race**: whichever resolves first — the transaction budget or
//!    an external signal (`Ctrl-C`, wired by the binary crate) — triggers the same shutdown path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kvbench_client::{AsyncDbClient, SyncDbClient};
use kvbench_common::{BenchError, BenchmarkConfig, FastRng, ValueSource};
use kvbench_metrics::{OpClass, Reporter};

use crate::metrics::WorkloadMetrics;
use crate::state::WorkerState;
use crate::worker::{AsyncWorker, InitWorker, SyncWorker};

/// Builds shared state, starts workers and reporters, and enforces shutdown for one benchmark
/// run.
pub struct Orchestrator {
    config: Arc<BenchmarkConfig>,
    metrics: Arc<WorkloadMetrics>,
    run_seed: u64,
}

impl Orchestrator {
    /// Validates `config` and builds the shared metrics cores. Fails fast on an invalid config.
    pub fn new(config: BenchmarkConfig) -> Result<Self, BenchError> {
        config.validate()?;
        let run_seed = config.seed.unwrap_or_else(default_run_seed);
        let config = Arc::new(config);
        let metrics = Arc::new(WorkloadMetrics::new(&config));
        Ok(Orchestrator { config, metrics, run_seed })
    }

    /// Shared metrics handle, useful for tests and for the binary crate's exit-code decision.
    pub fn metrics(&self) -> &Arc<WorkloadMetrics> {
        &self.metrics
    }

    /// Runs an init-mode population pass against `client`, partitioning the keyspace across
    /// `min(worker_count, init_record_count)` workers and waiting for all of them to finish.
    pub async fn run_init<C: SyncDbClient + 'static>(&self, client: Arc<C>) -> Result<(), BenchError> {
        let total = self.config.init_record_count();
        let worker_count = if total == 0 { 0 } else { self.config.worker_count.min(total as usize).max(1) };
        let ranges = partition_key_range(total, worker_count);

        let mut seed_rng = FastRng::for_worker(self.run_seed, 0);
        let value_source = Arc::new(ValueSource::new(&self.config, &mut seed_rng));

        let handles: Vec<_> = ranges
            .into_iter()
            .enumerate()
            .map(|(id, (key_start, key_count))| {
                InitWorker::new(
                    id,
                    Arc::clone(&client),
                    Arc::clone(&self.config),
                    Arc::clone(&self.metrics.write),
                    Arc::clone(&value_source),
                    WorkerState::new(),
                    self.run_seed,
                    key_start,
                    key_count,
                )
                .spawn()
            })
            .collect();

        let mut first_error = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::error!(%err, "init worker exited fatally");
                    first_error.get_or_insert(err);
                }
                Err(panic) => {
                    tracing::error!("init worker thread panicked: {panic:?}");
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Runs the mixed read/write workload with `worker_count` OS threads against `client`,
    /// printing live progress to stdout, until the transaction budget is reached or
    /// `stop_signal` resolves.
    pub async fn run_sync<C: SyncDbClient + 'static>(
        &self,
        client: Arc<C>,
        stop_signal: impl Future<Output = ()>,
    ) -> Result<(), BenchError> {
        let (read_reporter, write_reporter) = self.start_reporters();

        let mut seed_rng = FastRng::for_worker(self.run_seed, 0);
        let value_source = Arc::new(ValueSource::new(&self.config, &mut seed_rng));
        let states: Vec<WorkerState> = (0..self.config.worker_count).map(|_| WorkerState::new()).collect();

        let handles: Vec<_> = states
            .iter()
            .cloned()
            .enumerate()
            .map(|(id, state)| {
                SyncWorker::new(
                    id,
                    Arc::clone(&client),
                    Arc::clone(&self.config),
                    Arc::clone(&self.metrics),
                    Arc::clone(&value_source),
                    state,
                    self.run_seed,
                )
                .spawn()
            })
            .collect();

        self.wait_for_budget_or_stop(&states, stop_signal).await;

        for handle in handles {
            if let Err(panic) = handle.join() {
                tracing::error!("sync worker thread panicked: {panic:?}");
            }
        }
        read_reporter.stop().await;
        write_reporter.stop().await;
        Ok(())
    }

    /// Same as `run_sync` but drives `worker_count` independent `AsyncWorker`s, each itself
    /// `in_flight_max` cooperative slots, on the current tokio runtime.
    pub async fn run_async<C: AsyncDbClient + 'static>(
        &self,
        client: Arc<C>,
        stop_signal: impl Future<Output = ()>,
    ) -> Result<(), BenchError> {
        let (read_reporter, write_reporter) = self.start_reporters();

        let mut seed_rng = FastRng::for_worker(self.run_seed, 0);
        let value_source = Arc::new(ValueSource::new(&self.config, &mut seed_rng));
        let states: Vec<WorkerState> = (0..self.config.worker_count).map(|_| WorkerState::new()).collect();

        let mut handles = Vec::new();
        for (id, state) in states.iter().cloned().enumerate() {
            let worker = AsyncWorker::new(
                id,
                Arc::clone(&client),
                Arc::clone(&self.config),
                Arc::clone(&self.metrics),
                Arc::clone(&value_source),
                state,
                self.run_seed,
            );
            handles.extend(worker.spawn());
        }

        self.wait_for_budget_or_stop(&states, stop_signal).await;

        for handle in handles {
            if let Err(err) = handle.await {
                tracing::error!(%err, "async worker task panicked");
            }
        }
        read_reporter.stop().await;
        write_reporter.stop().await;
        Ok(())
    }

    fn start_reporters(&self) -> (Reporter, Reporter) {
        let read_reporter = Reporter::start(
            Arc::clone(&self.metrics.read),
            OpClass::Read,
            self.config.alt_histogram,
            tokio::io::stdout(),
        );
        let write_reporter = Reporter::start(
            Arc::clone(&self.metrics.write),
            OpClass::Write,
            self.config.alt_histogram,
            tokio::io::stdout(),
        );
        (read_reporter, write_reporter)
    }

    async fn wait_for_budget_or_stop(&self, states: &[WorkerState], stop_signal: impl Future<Output = ()>) {
        tokio::pin!(stop_signal);
        tokio::select! {
            _ = self.watch_budget() => {
                tracing::info!("transaction budget reached, signaling workers to stop");
            }
            _ = &mut stop_signal => {
                tracing::info!("external stop signal received, signaling workers to stop");
            }
        }
        for state in states {
            state.request_stop();
        }
    }

    async fn watch_budget(&self) {
        if self.config.tx_budget == 0 {
            std::future::pending::<()>().await;
            return;
        }
        let mut interval = tokio::time::interval(Duration::from_millis(1000));
        loop {
            interval.tick().await;
            let completed = self.metrics.total_count() + self.metrics.total_failures();
            if completed >= self.config.tx_budget {
                return;
            }
        }
    }
}

fn default_run_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x1234_5678_9abc_def0)
}

/// Partitions `[0, total)` into `workers` contiguous, disjoint ranges. The first
/// `total % workers` workers (in index order) receive one extra key each.
pub fn partition_key_range(total: u64, workers: usize) -> Vec<(u64, u64)> {
    if workers == 0 || total == 0 {
        return Vec::new();
    }
    let workers = workers as u64;
    let base = total / workers;
    let rem = total % workers;
    let mut ranges = Vec::with_capacity(workers as usize);
    let mut cursor = 0u64;
    for i in 0..workers {
        let count = base + u64::from(i < rem);
        ranges.push((cursor, count));
        cursor += count;
    }
    ranges
}
