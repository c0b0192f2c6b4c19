//! [`dispatch_kernel::TaskSink`] implementation over real WebSocket
//! connections.
//!
//! The engine never touches a socket directly: it calls through this sink,
//! which looks up the worker's outbound channel and pushes a serialized
//! [`ToWorker`] frame. If the worker has already disconnected the channel
//! send fails silently -- exactly the "swallow and let the timeout path
//! reclaim it" behavior §4.3 requires.

use async_trait::async_trait;
use dispatch_codec::{Codec, JsonCodec, ToWorker};
use dispatch_kernel::{Task, TaskSink, WorkerId};

use crate::state::Outboxes;

pub struct TransportSink {
    outboxes: Outboxes,
}

impl TransportSink {
    #[must_use]
    pub fn new(outboxes: Outboxes) -> Self {
        Self { outboxes }
    }

    fn deliver(&self, worker: WorkerId, message: &ToWorker) {
        let Some(outbox) = self.outboxes.get(&worker) else {
            tracing::trace!(%worker, "dropping outbound frame: worker has no open connection");
            return;
        };
        match message.to_json() {
            Ok(text) => {
                let _ = outbox.send(text);
            }
            Err(err) => tracing::warn!(%worker, error = %err, "failed to serialize outbound frame"),
        }
    }
}

#[async_trait]
impl TaskSink for TransportSink {
    async fn send_function(&self, worker: WorkerId, f_blob: &[u8]) {
        self.deliver(worker, &ToWorker::function(f_blob));
    }

    async fn send_task(&self, worker: WorkerId, task: &Task) {
        let envelope = match JsonCodec.encode(&(task.index, task.payload.clone())) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%worker, error = %err, "failed to encode task envelope");
                return;
            }
        };
        self.deliver(worker, &ToWorker::data(&envelope));
    }
}
