//! The injected capability the engine uses to actually reach a worker.
//!
//! `dispatch-kernel` has no opinion about sockets, WebSockets, or HTTP --
//! that's `dispatch-transport`'s job. The engine only ever calls through
//! this trait, the same way it only ever calls through
//! [`dispatch_codec::Codec`] for serialization. This keeps the core testable
//! with a plain in-memory mock (see `tests/integration.rs`).

use async_trait::async_trait;

use crate::task::{Task, WorkerId};

/// Delivers `function`/`data` messages to a specific worker.
///
/// A send failure (broken connection) must be swallowed by the
/// implementation -- the engine does not treat it as fatal; the timeout
/// path reclaims the task instead (§4.3).
#[async_trait]
pub trait TaskSink: Send + Sync {
    /// Send the current session's `f` blob to `worker`.
    async fn send_function(&self, worker: WorkerId, f_blob: &[u8]);

    /// Send a task dispatch to `worker`.
    async fn send_task(&self, worker: WorkerId, task: &Task);
}
