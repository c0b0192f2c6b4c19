//! Shared application state for the transport server.
//!
//! [`AppState`] is wrapped in an `Arc` and shared across every request
//! handler and WebSocket connection, the same shape as the corpus's
//! `openintent_web::AppState`.

use std::sync::Arc;

use dashmap::DashMap;
use dispatch_kernel::{DispatchEngine, WorkerId, WorkerRegistry};
use tokio::sync::mpsc;

use crate::config::TransportConfig;

/// An outbound frame queued for delivery to one worker's WebSocket task.
pub type Outbox = mpsc::UnboundedSender<String>;

/// Per-connection outbound channels, keyed by worker id.
///
/// Built independently of [`AppState`] so a [`crate::sink::TransportSink`]
/// can be constructed -- and handed to a [`DispatchEngine`] -- before the
/// engine itself exists to be wrapped in an `AppState`.
pub type Outboxes = Arc<DashMap<WorkerId, Outbox>>;

/// Shared state accessible from every transport handler.
pub struct AppState {
    pub registry: WorkerRegistry,
    pub config: TransportConfig,
    /// The WebSocket read loop for a worker owns the receiving half and
    /// forwards frames to the socket; `send_task`/`send_function` push onto
    /// this channel rather than holding the socket directly, so
    /// [`crate::sink::TransportSink`] never blocks on a handler task.
    pub outboxes: Outboxes,
}

impl AppState {
    #[must_use]
    pub fn new(engine: DispatchEngine, config: TransportConfig, outboxes: Outboxes) -> Arc<Self> {
        Arc::new(Self {
            registry: WorkerRegistry::new(engine),
            config,
            outboxes,
        })
    }
}
