// kvbench-core - Worker loops, lifecycle state, and the orchestrator driving one benchmark run.
//
// Sync workers are plain OS threads over a blocking `SyncDbClient`; async workers are tokio task
// slots over an `AsyncDbClient`. Both report into a shared `WorkloadMetrics`, and the orchestrator
// owns starting, budget/stop racing, and stopping everything cleanly.

pub mod metrics;
pub mod orchestrator;
pub mod state;
pub mod worker;

pub use metrics::WorkloadMetrics;
pub use orchestrator::{partition_key_range, Orchestrator};
pub use state::{WorkerState, WorkerStatus};
pub use worker::{AsyncWorker, InitWorker, SyncWorker, MAX_INIT_RETRIES};
