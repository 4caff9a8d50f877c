//! # Worker State Machine
//!
//! Purpose: Track one worker's lifecycle (`Idle -> Running -> Stopping -> Stopped`) behind a
//! handle the orchestrator can poll without joining the worker's thread or task.
//!
//! ## Design Principles
//! 1. **Shared Stop Flag, Private Status**: the `valid` flag is the only thing a worker and the
//!    orchestrator both write; `status` is written only by the worker itself and read by anyone.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// A worker's current lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Constructed but not yet started.
    Idle,
    /// Actively issuing operations.
    Running,
    /// Told to stop; finishing its current in-flight operation.
    Stopping,
    /// Fully quiesced; safe to join.
    Stopped,
}

impl WorkerStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => WorkerStatus::Idle,
            1 => WorkerStatus::Running,
            2 => WorkerStatus::Stopping,
            _ => WorkerStatus::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WorkerStatus::Idle => 0,
            WorkerStatus::Running => 1,
            WorkerStatus::Stopping => 2,
            WorkerStatus::Stopped => 3,
        }
    }
}

/// Shared handle to one worker's lifecycle. Cheap to clone; every clone observes the same
/// underlying atomics.
#[derive(Clone)]
pub struct WorkerState {
    status: Arc<AtomicU8>,
    valid: Arc<AtomicBool>,
}

impl WorkerState {
    /// Builds a new handle in the `Idle` state, valid (not yet told to stop).
    pub fn new() -> Self {
        WorkerState {
            status: Arc::new(AtomicU8::new(WorkerStatus::Idle.as_u8())),
            valid: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Current lifecycle stage.
    pub fn status(&self) -> WorkerStatus {
        WorkerStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    /// Whether the worker should keep issuing operations. Checked at the top of each loop
    /// iteration (sync) or before each new command (async).
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Relaxed)
    }

    /// Tells the worker to stop after its current operation. Idempotent.
    pub fn request_stop(&self) {
        self.valid.store(false, Ordering::Relaxed);
    }

    /// Transitions to `Running`. Called once, at the top of the worker's loop.
    pub fn mark_running(&self) {
        self.status.store(WorkerStatus::Running.as_u8(), Ordering::Relaxed);
    }

    /// Transitions to `Stopping`. Called once the worker has observed `is_valid() == false` or
    /// exhausted its key range.
    pub fn mark_stopping(&self) {
        self.status.store(WorkerStatus::Stopping.as_u8(), Ordering::Relaxed);
    }

    /// Transitions to `Stopped`. Called after the last in-flight operation has been recorded.
    pub fn mark_stopped(&self) {
        self.status.store(WorkerStatus::Stopped.as_u8(), Ordering::Relaxed);
    }
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_valid() {
        let state = WorkerState::new();
        assert_eq!(state.status(), WorkerStatus::Idle);
        assert!(state.is_valid());
    }

    #[test]
    fn walks_through_the_full_lifecycle() {
        let state = WorkerState::new();
        state.mark_running();
        assert_eq!(state.status(), WorkerStatus::Running);
        state.request_stop();
        assert!(!state.is_valid());
        state.mark_stopping();
        assert_eq!(state.status(), WorkerStatus::Stopping);
        state.mark_stopped();
        assert_eq!(state.status(), WorkerStatus::Stopped);
    }

    #[test]
    fn clones_observe_the_same_state() {
        let a = WorkerState::new();
        let b = a.clone();
        a.mark_running();
        b.request_stop();
        assert_eq!(b.status(), WorkerStatus::Running);
        assert!(!a.is_valid());
    }
}
