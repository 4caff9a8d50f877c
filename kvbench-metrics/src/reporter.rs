//! # Reporter
//!
//! Purpose: A single-writer 1 Hz timer that rolls over per-period metrics and prints live
//! throughput and latency-bucket tables.
//!
//! ## Design Principles
//! 1. **Re-Entrancy Guard**: A busy tick is dropped, never queued, so a slow print never causes
//!    ticks to pile up.
//! 2. **Single Writer**: `MetricsCore::swap_period` is `pub(crate)`, so only code inside this
//!    crate — in practice, only this module — can roll a period over.
//! 3. **I/O Never Stops Metrics**: A failed write is logged and ignored; the run keeps going.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kvbench_common::BenchError;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

use crate::counters::MetricsCore;

/// Label used in the report line, e.g. `write`, `read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// Write operations (puts).
    Write,
    /// Read operations (gets and batch gets).
    Read,
}

impl OpClass {
    fn label(self) -> &'static str {
        match self {
            OpClass::Write => "write",
            OpClass::Read => "read",
        }
    }
}

/// Owned state the reporter's background task captures, replacing a callback-captured tuple
/// with a plain struct.
struct ReporterState {
    metrics: Arc<MetricsCore>,
    op_class: OpClass,
    alt_histogram: bool,
    header_printed: bool,
    /// `metrics.app_elapsed_ms()` as of the previous tick, so `tick` can compute the real
    /// elapsed seconds for tps instead of assuming a perfect 1 Hz cadence — `MissedTickBehavior`
    /// drops rather than queues a busy tick, so the next one can land 2s+ after the last.
    last_tick_ms: u64,
}

/// Periodic (1 Hz) rollover and console emission, plus a terminal summary on stop.
pub struct Reporter {
    busy: Arc<AtomicBool>,
    stop_tx: tokio::sync::watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
    metrics: Arc<MetricsCore>,
    alt_histogram: bool,
}

impl Reporter {
    /// Spawns the 1 Hz reporter task, writing formatted lines to `sink` (usually stdout).
    pub fn start<W>(metrics: Arc<MetricsCore>, op_class: OpClass, alt_histogram: bool, sink: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let busy = Arc::new(AtomicBool::new(false));
        let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);

        let mut state = ReporterState {
            metrics: Arc::clone(&metrics),
            op_class,
            alt_histogram,
            header_printed: false,
            last_tick_ms: metrics.app_elapsed_ms(),
        };
        let busy_for_task = Arc::clone(&busy);
        let mut sink = sink;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(1000));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            if state.metrics.histogram().is_some() && !state.header_printed {
                write_histogram_header(&mut sink, &state).await;
                state.header_printed = true;
            }

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if busy_for_task.swap(true, Ordering::Acquire) {
                            // A previous tick is still writing; drop this one rather than queue.
                            continue;
                        }
                        tick(&mut sink, &mut state).await;
                        busy_for_task.store(false, Ordering::Release);
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            final_summary(&mut sink, &state).await;
        });

        Reporter {
            busy,
            stop_tx,
            handle: Some(handle),
            metrics,
            alt_histogram,
        }
    }

    /// Signals the reporter task to flush a final block and print the latency summary, then
    /// waits for it to finish.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                tracing::warn!(%err, "reporter task panicked during shutdown");
            }
        }
    }

    /// Whether the reporter is mid-tick (exposed for tests / introspection).
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    /// Shared metrics handle this reporter is driving.
    pub fn metrics(&self) -> &Arc<MetricsCore> {
        &self.metrics
    }
}

/// Writes `bytes` to `sink`, logging (and otherwise ignoring) a failure as `ReporterIo` — the
/// one place all seven write sites in this module route through, so none of them silently drops
/// an I/O error.
async fn write_or_warn<W: AsyncWrite + Unpin>(sink: &mut W, bytes: &[u8], what: &str) {
    if let Err(io_err) = sink.write_all(bytes).await {
        let err = BenchError::ReporterIo(io_err.to_string());
        tracing::warn!(%err, what, "reporter write failed");
    }
}

async fn write_histogram_header<W: AsyncWrite + Unpin>(sink: &mut W, state: &ReporterState) {
    let Some(hist) = state.metrics.histogram() else {
        return;
    };
    let headers: Vec<String> = (0..hist.columns()).map(|i| hist.header(i, state.alt_histogram)).collect();
    let line = format!("{:<8}{}\n", "op", headers.join("  "));
    write_or_warn(sink, line.as_bytes(), "histogram header").await;
}

async fn tick<W: AsyncWrite + Unpin>(sink: &mut W, state: &mut ReporterState) {
    let block = state.metrics.swap_period();
    let now_ms = state.metrics.app_elapsed_ms();
    let elapsed_ms = now_ms.saturating_sub(state.last_tick_ms);
    state.last_tick_ms = now_ms;
    if block.count == 0 {
        return;
    }
    let now = chrono::Utc::now();
    // `elapsed_ms` is the real time since the previous tick, not a fixed 1s — a tick dropped by
    // `MissedTickBehavior::Skip` can make this 2s, 3s, etc.
    let period_secs = (elapsed_ms as f64 / 1000.0).max(0.001);
    let tps = (block.count as f64 / period_secs).round() as u64;
    let line = format!(
        "{} {}(count={} tps={} timeouts={} errors={})\n",
        now.format("%Y-%m-%d %H:%M:%S"),
        state.op_class.label(),
        block.count,
        tps,
        block.timeouts,
        block.errors,
    );
    write_or_warn(sink, line.as_bytes(), "period line").await;

    if let Some(hist) = state.metrics.histogram() {
        let counts: Vec<String> = (0..hist.columns()).map(|i| hist.bucket(i).to_string()).collect();
        let row = format!("{:<8}{}\n", state.op_class.label(), counts.join("  "));
        write_or_warn(sink, row.as_bytes(), "histogram row").await;
    }
}

async fn final_summary<W: AsyncWrite + Unpin>(sink: &mut W, state: &ReporterState) {
    let block = state.metrics.swap_period();
    if block.count > 0 {
        let now = chrono::Utc::now();
        let line = format!(
            "{} {}(count={} tps=- timeouts={} errors={})\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            state.op_class.label(),
            block.count,
            block.timeouts,
            block.errors,
        );
        write_or_warn(sink, line.as_bytes(), "final summary line").await;
    }

    if let Some(hist) = state.metrics.histogram() {
        write_or_warn(sink, b"Latency Summary\n", "latency summary label").await;
        let headers: Vec<String> = (0..hist.columns()).map(|i| hist.header(i, state.alt_histogram)).collect();
        let header_line = format!("{:<8}{}\n", "op", headers.join("  "));
        write_or_warn(sink, header_line.as_bytes(), "latency summary header").await;
        let counts: Vec<String> = (0..hist.columns()).map(|i| hist.bucket(i).to_string()).collect();
        let count_line = format!("{:<8}{}\n", state.op_class.label(), counts.join("  "));
        write_or_warn(sink, count_line.as_bytes(), "latency summary counts").await;
    }
}
