//! Session Controller (§4.1, §4.5): the public `map` entry point and the
//! `Idle -> Starting -> Running -> Draining -> Idle` lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dispatch_codec::{Codec, JsonCodec};
use dispatch_kernel::{EngineConfig, ProgressBus, Task};
use dispatch_transport::TransportConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Notify;

use crate::config::SessionConfig;
use crate::error::Result;

/// Wires a [`dispatch_kernel::DispatchEngine`] to a
/// [`dispatch_transport::TransportServer`] and exposes the single `map`
/// operation. One `Coordinator` hosts one session at a time; calling `map`
/// while another call is in flight fails with
/// [`dispatch_kernel::EngineError::SessionAlreadyActive`].
pub struct Coordinator {
    config: SessionConfig,
    progress: ProgressBus,
    cancel_requested: Arc<AtomicBool>,
    cancel_notify: Arc<Notify>,
}

impl Coordinator {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            progress: ProgressBus::default(),
            cancel_requested: Arc::new(AtomicBool::new(false)),
            cancel_notify: Arc::new(Notify::new()),
        }
    }

    /// Subscribe to progress events for the next (or current) session.
    #[must_use]
    pub fn progress(&self) -> ProgressBus {
        self.progress.clone()
    }

    /// Request cancellation of the in-flight (or next-started) session
    /// (§5's `CancellationToken`-style shutdown extension). Results not
    /// yet collected are discarded; [`Coordinator::map`] returns
    /// [`dispatch_kernel::EngineError::Cancelled`].
    pub fn shutdown(&self) {
        self.cancel_requested.store(true, Ordering::Release);
        self.cancel_notify.notify_waiters();
    }

    /// Map `f` over `inputs` using `chunk_size` (§4.1).
    ///
    /// `f_blob` is never interpreted by the coordinator -- it is handed to
    /// the transport exactly as given, to be codec-encoded once more only
    /// as part of the `function` wire message.
    pub async fn map<A, B>(&self, f_blob: Vec<u8>, inputs: Vec<A>, chunk_size: usize) -> Result<Vec<B>>
    where
        A: Serialize,
        B: DeserializeOwned,
    {
        self.cancel_requested.store(false, Ordering::Release);

        let codec = JsonCodec;
        let n = inputs.len();
        let mut tasks = Vec::with_capacity(n);
        for (index, input) in inputs.into_iter().enumerate() {
            tasks.push(Task {
                index: index as u32,
                payload: codec.encode(&input)?,
            });
        }

        // Starting: construct the engine and transport, then activate the
        // session (step 1) *before* the listener accepts any connections
        // (step 2). Doing it in this order means no worker can ever observe
        // `active == false` while the socket is already live -- a worker
        // that connects the instant the listener binds is handled by
        // `WorkerRegistry::on_connect` exactly like any other, because
        // `is_active()` is already `true`.
        let engine_config = EngineConfig {
            chunk_size,
            timeout: Duration::from_secs(self.config.timeout_seconds),
            max_attempts: self.config.max_attempts,
        };
        let (engine, transport) = dispatch_transport::build(engine_config, self.config.transport.clone(), self.progress.clone());

        engine.begin_session(f_blob, tasks).await?;

        // Running: start accepting worker connections.
        let handle = transport.start().await?;

        let cancel_requested = Arc::clone(&self.cancel_requested);
        let cancel_notify = Arc::clone(&self.cancel_notify);
        let cancel_engine = engine.clone();
        let canceller = tokio::spawn(async move {
            loop {
                if cancel_requested.load(Ordering::Acquire) {
                    cancel_engine.cancel();
                    return;
                }
                cancel_notify.notified().await;
            }
        });

        let drained = engine.run_until_drained().await;
        canceller.abort();

        // Draining: tear down the transport regardless of outcome.
        handle.shutdown().await;

        let pairs = drained?;
        let mut results = Vec::with_capacity(n);
        for (_, payload) in pairs {
            results.push(codec.decode(&payload)?);
        }
        Ok(results)
    }
}
