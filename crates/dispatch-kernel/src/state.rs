//! Session state: the data the Dispatch Engine, Worker Registry, and Result
//! Collector all mutate under a single lock.
//!
//! Serializing access to this struct behind one mutex (pattern (b) from the
//! specification's concurrency model) is what keeps the five core
//! invariants trivially checkable: every mutation that could break one of
//! them touches this struct and only this struct.

use std::collections::{HashMap, VecDeque};

use crate::task::{InFlight, Task, WorkerId};

/// All state belonging to one `map(f, inputs)` invocation.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Whether a session is currently running. `false` between calls.
    pub active: bool,

    /// The codec-encoded `f` blob for the current session, once known.
    pub f_blob: Option<Vec<u8>>,

    /// Tasks ready for immediate assignment to a worker.
    pub pending: VecDeque<Task>,

    /// Tasks not yet promoted into `pending` (throttled by `chunk_size`).
    pub unqueued: VecDeque<Task>,

    /// Tasks currently assigned to a worker, keyed by index.
    pub in_flight: HashMap<u32, InFlight>,

    /// Workers eligible for immediate assignment, FIFO.
    pub ready: VecDeque<WorkerId>,

    /// Completed results, keyed by index.
    pub completed: HashMap<u32, Vec<u8>>,

    /// Total number of inputs in the current session.
    pub n_total: usize,

    /// Retry counts per index, used only when `max_attempts` is set.
    pub attempts: HashMap<u32, u32>,
}

impl SessionState {
    /// Reset to the `Idle` state between sessions (end of §4.5's
    /// `Draining -> Idle` transition).
    pub fn reset(&mut self) {
        *self = SessionState::default();
    }

    /// `true` once `pending`, `in_flight`, and `unqueued` are all empty --
    /// the dispatch loop's termination condition (§4.3).
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty() && self.unqueued.is_empty()
    }

    /// Remove a worker from the ready queue if present, without touching
    /// its in-flight entries (§4.2 `on_disconnect`).
    pub fn remove_from_ready(&mut self, worker_id: WorkerId) {
        self.ready.retain(|id| *id != worker_id);
    }

    /// Push a worker to the back of the ready queue unless it is already
    /// there (the ready-queue-re-entry REDESIGN FLAG).
    pub fn enqueue_ready(&mut self, worker_id: WorkerId) {
        if !self.ready.contains(&worker_id) {
            self.ready.push_back(worker_id);
        }
    }

    /// `true` if the given worker currently holds any in-flight task.
    pub fn worker_is_busy(&self, worker_id: WorkerId) -> bool {
        self.in_flight.values().any(|e| e.worker_id == worker_id)
    }

    /// Check invariant 1 and 2 from §8 -- used only by tests, since they're
    /// true by construction in every other code path.
    #[cfg(test)]
    pub fn check_invariants(&self) {
        for index in self.completed.keys() {
            assert!(
                !self.in_flight.contains_key(index),
                "index {index} is both completed and in-flight"
            );
        }
        let sum = self.completed.len() + self.in_flight.len() + self.pending.len() + self.unqueued.len();
        assert_eq!(sum, self.n_total, "conservation invariant violated");
        for worker_id in &self.ready {
            assert!(
                !self.worker_is_busy(*worker_id),
                "worker {worker_id} is ready but also in-flight"
            );
        }
    }
}
