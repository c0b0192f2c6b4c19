//! Worker Registry (§4.2): tracks connected workers and drives their
//! transition into the ready queue on connect.
//!
//! Modeled on the corpus's `AdapterRegistry` -- a `DashMap` keyed by id,
//! wrapped in a small struct with explicit lifecycle methods -- but the
//! states here are the ones in the specification, not the adapter health
//! states the corpus tracks.

use std::sync::Arc;

use dashmap::DashMap;

use crate::engine::DispatchEngine;
use crate::task::WorkerId;

/// Where a registered worker sits relative to the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Connected, but no session is active yet (or the session has no `f`
    /// blob to hand out). Not in the engine's ready queue.
    Connecting,
    /// Connected and in the engine's ready queue, eligible for dispatch.
    Ready,
    /// Connected and currently holding at least one in-flight task.
    Busy,
}

/// Bookkeeping the registry keeps about one connected worker.
#[derive(Debug, Clone)]
pub struct WorkerInfo {
    pub id: WorkerId,
    pub address: String,
    pub state: WorkerState,
}

/// Tracks connected workers and mediates between transport-level
/// connect/disconnect events and the engine's ready queue.
///
/// Cheaply cloneable (`Arc`-backed internals) and `Send + Sync`.
#[derive(Clone)]
pub struct WorkerRegistry {
    engine: DispatchEngine,
    workers: Arc<DashMap<WorkerId, WorkerInfo>>,
}

impl WorkerRegistry {
    #[must_use]
    pub fn new(engine: DispatchEngine) -> Self {
        Self {
            engine,
            workers: Arc::new(DashMap::new()),
        }
    }

    /// §4.2 `on_connect`: record the worker, and if a session is active
    /// with a known `f` blob, immediately deliver it and mark the worker
    /// ready.
    pub async fn on_connect(&self, worker_id: WorkerId, address: String) {
        let state = if self.engine.is_active().await {
            if let Some(f_blob) = self.engine.f_blob().await {
                self.engine.deliver_function(worker_id, &f_blob).await;
                self.engine.mark_ready(worker_id).await;
                WorkerState::Ready
            } else {
                WorkerState::Connecting
            }
        } else {
            WorkerState::Connecting
        };

        self.workers.insert(
            worker_id,
            WorkerInfo {
                id: worker_id,
                address,
                state,
            },
        );
        tracing::info!(%worker_id, "worker connected");
    }

    /// §4.2 `on_disconnect`: remove the worker from the ready queue and
    /// drop its registry entry. Any in-flight task it held is reclaimed by
    /// the engine's timeout path, not here.
    pub async fn on_disconnect(&self, worker_id: WorkerId) {
        self.engine.remove_ready(worker_id).await;
        self.workers.remove(&worker_id);
        tracing::info!(%worker_id, "worker disconnected");
    }

    /// §4.2 `on_message` for a `ready` frame: mark the worker ready and
    /// update its recorded state. Silently ignored when no session is
    /// active, per the `on_message` contract.
    pub async fn on_ready(&self, worker_id: WorkerId) {
        if !self.engine.is_active().await {
            return;
        }
        self.engine.mark_ready(worker_id).await;
        if let Some(mut entry) = self.workers.get_mut(&worker_id) {
            entry.state = WorkerState::Ready;
        }
    }

    /// §4.2 `on_message` for a `result` frame: forward to the engine's
    /// Result Collector and update the worker's recorded state if it
    /// became idle. Silently ignored when no session is active, per the
    /// `on_message` contract.
    pub async fn on_result(&self, worker_id: WorkerId, index: u32, payload: Vec<u8>) {
        if !self.engine.is_active().await {
            return;
        }
        self.engine.record_result(worker_id, index, payload).await;
        if let Some(mut entry) = self.workers.get_mut(&worker_id) {
            entry.state = if self.engine.worker_is_ready(worker_id).await {
                WorkerState::Ready
            } else {
                WorkerState::Busy
            };
        }
    }

    /// Currently registered worker ids.
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.workers.iter().map(|e| *e.key()).collect()
    }

    /// Number of currently registered workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
