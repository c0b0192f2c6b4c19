//! The Dispatch Engine (§4.3): pending queue, in-flight table with
//! deadlines, ready-worker queue, and the matching/timeout/retry rules.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::collector::{self, ResultOutcome};
use crate::error::{EngineError, Result};
use crate::progress::{Progress, ProgressBus};
use crate::sink::TaskSink;
use crate::state::SessionState;
use crate::task::{InFlight, Task, WorkerId};

/// Tuning knobs for one [`DispatchEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of consecutive tasks handed to a single worker per
    /// dispatch decision, and a throttle on queue depth.
    pub chunk_size: usize,
    /// Per-task timeout, starting at dispatch time.
    pub timeout: Duration,
    /// Optional retry cap. `None` preserves the specification's default
    /// unbounded-retry behavior; `Some(n)` promotes a task that keeps timing
    /// out past `n` attempts to a fatal [`EngineError::RetryLimitExceeded`].
    pub max_attempts: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1,
            timeout: Duration::from_secs(60),
            max_attempts: None,
        }
    }
}

/// The heart of the system (§4.3). Cheaply cloneable (`Arc`-backed) and
/// `Send + Sync`.
#[derive(Clone)]
pub struct DispatchEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    state: Mutex<SessionState>,
    notify: Notify,
    sink: Arc<dyn TaskSink>,
    progress: ProgressBus,
    config: EngineConfig,
    cancelled: AtomicBool,
    fatal: Mutex<Option<EngineError>>,
}

impl DispatchEngine {
    /// Create a new engine bound to a [`TaskSink`] for the lifetime of the
    /// coordinator process. Sessions are started and drained with
    /// [`DispatchEngine::begin_session`]/[`DispatchEngine::run_until_drained`].
    #[must_use]
    pub fn new(config: EngineConfig, sink: Arc<dyn TaskSink>, progress: ProgressBus) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                state: Mutex::new(SessionState::default()),
                notify: Notify::new(),
                sink,
                progress,
                config,
                cancelled: AtomicBool::new(false),
                fatal: Mutex::new(None),
            }),
        }
    }

    /// Begin a new session: validate no session is already active, then
    /// populate state with the encoded `f` blob and the full task list.
    pub async fn begin_session(&self, f_blob: Vec<u8>, tasks: Vec<Task>) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        if state.active {
            return Err(EngineError::SessionAlreadyActive);
        }
        state.reset();
        state.active = true;
        state.n_total = tasks.len();
        state.f_blob = Some(f_blob);
        state.unqueued = tasks.into_iter().collect::<VecDeque<_>>();
        self.inner.cancelled.store(false, Ordering::Release);
        *self.inner.fatal.lock().await = None;
        drop(state);
        self.inner.notify.notify_waiters();
        Ok(())
    }

    /// The current session's encoded `f` blob, if a session is active.
    pub async fn f_blob(&self) -> Option<Vec<u8>> {
        self.inner.state.lock().await.f_blob.clone()
    }

    /// Whether a session is currently active.
    pub async fn is_active(&self) -> bool {
        self.inner.state.lock().await.active
    }

    /// Send the current `f` blob to `worker` through the injected sink.
    pub async fn deliver_function(&self, worker: WorkerId, f_blob: &[u8]) {
        self.inner.sink.send_function(worker, f_blob).await;
    }

    /// Add a worker to the ready queue (idempotent -- see the ready-queue
    /// REDESIGN FLAG), and wake the dispatch loop.
    pub async fn mark_ready(&self, worker: WorkerId) {
        let mut state = self.inner.state.lock().await;
        state.enqueue_ready(worker);
        drop(state);
        self.inner.notify.notify_waiters();
    }

    /// Remove a worker from the ready queue without touching its in-flight
    /// entries (§4.2 `on_disconnect`).
    pub async fn remove_ready(&self, worker: WorkerId) {
        let mut state = self.inner.state.lock().await;
        state.remove_from_ready(worker);
    }

    /// Whether `worker` is currently sitting in the ready queue.
    pub async fn worker_is_ready(&self, worker: WorkerId) -> bool {
        self.inner.state.lock().await.ready.contains(&worker)
    }

    /// Apply a `result(worker, (index, payload))` message (§4.4). Returns
    /// whether the result was recorded or dropped as a late duplicate.
    pub async fn record_result(
        &self,
        worker: WorkerId,
        index: u32,
        payload: Vec<u8>,
    ) -> ResultOutcome {
        let mut state = self.inner.state.lock().await;
        if !state.active {
            return ResultOutcome::Dropped;
        }
        let (outcome, worker_now_idle) = collector::apply_result(&mut state, worker, index, payload);
        if outcome == ResultOutcome::Recorded {
            if worker_now_idle {
                state.enqueue_ready(worker);
            }
            let progress = Progress {
                completed: state.completed.len(),
                total: state.n_total,
            };
            drop(state);
            self.inner.progress.publish(progress);
            self.inner.notify.notify_waiters();
        }
        outcome
    }

    /// Request cancellation: the dispatch loop stops making progress and
    /// `run_until_drained` returns [`EngineError::Cancelled`].
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Drive the dispatch loop (§4.3) until `pending`, `in_flight`, and
    /// `unqueued` are all empty, then return the completed results sorted
    /// by index.
    pub async fn run_until_drained(&self) -> Result<Vec<(u32, Vec<u8>)>> {
        let mut sweep_interval = tokio::time::interval(Duration::from_secs(1));
        sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            if self.is_cancelled() {
                let mut state = self.inner.state.lock().await;
                state.reset();
                return Err(EngineError::Cancelled);
            }
            if let Some(err) = self.inner.fatal.lock().await.take() {
                let mut state = self.inner.state.lock().await;
                state.reset();
                return Err(err);
            }

            self.drain_dispatch().await?;

            {
                let mut state = self.inner.state.lock().await;
                if state.is_drained() {
                    let mut results: Vec<(u32, Vec<u8>)> =
                        state.completed.iter().map(|(i, v)| (*i, v.clone())).collect();
                    results.sort_by_key(|(index, _)| *index);
                    state.reset();
                    return Ok(results);
                }
            }

            tokio::select! {
                _ = sweep_interval.tick() => self.timeout_sweep().await,
                _ = self.inner.notify.notified() => {}
                _ = tokio::time::sleep(Duration::from_millis(1)) => {}
            }
        }
    }

    /// Step 1: transfer up to `chunk_size` tasks from `pending` to a ready
    /// worker, while refilling `pending` from `unqueued` as needed (step 3
    /// is folded in here so a freshly-refilled `pending` is dispatched in
    /// the same tick).
    async fn drain_dispatch(&self) -> Result<()> {
        loop {
            let chunk_size = self.inner.config.chunk_size;
            let assignment = {
                let mut state = self.inner.state.lock().await;

                // Step 3: refill pending from unqueued.
                while state.pending.len() < chunk_size && !state.unqueued.is_empty() {
                    if let Some(task) = state.unqueued.pop_front() {
                        state.pending.push_back(task);
                    }
                }

                let should_dispatch =
                    state.pending.len() >= chunk_size || (state.unqueued.is_empty() && !state.pending.is_empty());
                if !should_dispatch {
                    break;
                }

                let Some(worker) = state.ready.pop_front() else {
                    break;
                };

                let mut assigned = Vec::with_capacity(chunk_size.min(state.pending.len()));
                for _ in 0..chunk_size.min(state.pending.len()) {
                    if let Some(task) = state.pending.pop_front() {
                        assigned.push(task);
                    }
                }

                let deadline = Instant::now() + self.inner.config.timeout;
                for task in &assigned {
                    state.in_flight.insert(
                        task.index,
                        InFlight {
                            worker_id: worker,
                            task: task.clone(),
                            deadline,
                        },
                    );
                }

                Some((worker, assigned))
            };

            let Some((worker, assigned)) = assignment else {
                break;
            };

            for task in &assigned {
                // A send failure is swallowed (§4.3): the in-flight entry
                // remains and the timeout path will reclaim the task.
                self.inner.sink.send_task(worker, task).await;
            }
        }
        Ok(())
    }

    /// Step 2: reclaim any in-flight task whose deadline has passed.
    async fn timeout_sweep(&self) {
        let now = Instant::now();
        let mut state = self.inner.state.lock().await;

        let expired: Vec<u32> = state
            .in_flight
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(index, _)| *index)
            .collect();

        for index in expired {
            let Some(entry) = state.in_flight.remove(&index) else {
                continue;
            };
            tracing::warn!(task_index = index, worker_id = %entry.worker_id, "task timed out, retrying");

            if let Some(max_attempts) = self.inner.config.max_attempts {
                let attempts = state.attempts.entry(index).or_insert(0);
                *attempts += 1;
                if *attempts > max_attempts {
                    *self.inner.fatal.lock().await = Some(EngineError::RetryLimitExceeded {
                        index,
                        max_attempts,
                    });
                    continue;
                }
            }

            state.unqueued.push_back(entry.task);
        }
    }
}
