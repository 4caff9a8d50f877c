//! # kvbench
//!
//! Load generator and latency-measurement harness for a distributed key/value database. Builds a
//! `BenchmarkConfig` from the environment, wires an `Orchestrator` around the reference in-memory
//! `DbClient`, and runs an optional init pass followed by the mixed read/write workload until the
//! transaction budget is reached or `Ctrl-C` is received.
//!
//! ## Design Principles
//! 1. **Async First**: the whole run lives on one tokio runtime, mirroring the teacher's own
//!    `#[tokio::main]` entry point.
//! 2. **Fail Fast On Config**: an invalid environment exits non-zero before anything is started.

mod env_config;

use std::process::ExitCode;
use std::sync::Arc;

use kvbench_client::{MockAsyncDbClient, MockDbClient};
use kvbench_common::Mode;
use kvbench_core::Orchestrator;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match env_config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let mode = config.mode;
    let init_record_count = config.init_record_count();

    let orchestrator = match Orchestrator::new(config) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            tracing::error!(%err, "failed to build orchestrator");
            return ExitCode::FAILURE;
        }
    };

    let run_result = match mode {
        Mode::Sync => {
            let client = Arc::new(MockDbClient::new());
            if init_record_count > 0 {
                if let Err(err) = orchestrator.run_init(Arc::clone(&client)).await {
                    tracing::error!(%err, "init pass failed");
                    return ExitCode::FAILURE;
                }
            }
            orchestrator.run_sync(client, ctrl_c()).await
        }
        Mode::Async => {
            if init_record_count > 0 {
                // `InitWorker` is generic over `SyncDbClient`; the reference async mock has no
                // sync counterpart sharing its backing store, so an async-mode init pass has
                // nothing to populate against here. A real `AsyncDbClient` talking to an actual
                // external database would not have this gap.
                tracing::warn!("KVBENCH_INIT_PCT > 0 has no effect in async mode against the reference mock client");
            }
            let client = Arc::new(MockAsyncDbClient::new());
            orchestrator.run_async(client, ctrl_c()).await
        }
    };

    match run_result {
        Ok(()) => {
            tracing::info!(
                total = orchestrator.metrics().total_count(),
                failures = orchestrator.metrics().total_failures(),
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "run ended with an error");
            ExitCode::FAILURE
        }
    }
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to install Ctrl-C handler; stop signal will never fire");
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received, shutting down");
}
