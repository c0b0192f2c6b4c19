//! Worker-facing transport for dispatch (§4.6).
//!
//! Implements `dispatch_kernel::TaskSink` over real axum WebSocket
//! connections and serves the static bootstrap assets workers fetch before
//! connecting. The dispatch engine never imports this crate; it is the
//! other way around -- this crate depends on `dispatch-kernel` and hands it
//! a [`sink::TransportSink`].

pub mod assets;
pub mod config;
pub mod error;
pub mod server;
pub mod sink;
pub mod state;
pub mod ws;

use std::sync::Arc;

use dashmap::DashMap;
use dispatch_kernel::{DispatchEngine, EngineConfig, ProgressBus};

pub use config::TransportConfig;
pub use error::{Result, TransportError};
pub use server::{TransportHandle, TransportServer};
pub use sink::TransportSink;
pub use state::{AppState, Outboxes};

/// Build a [`DispatchEngine`] wired to a fresh [`TransportServer`] sharing
/// its outbound-frame table, so callers never have to construct a
/// [`TransportSink`] by hand.
#[must_use]
pub fn build(engine_config: EngineConfig, transport_config: TransportConfig, progress: ProgressBus) -> (DispatchEngine, TransportServer) {
    let outboxes: Outboxes = Arc::new(DashMap::new());
    let sink = Arc::new(TransportSink::new(outboxes.clone()));
    let engine = DispatchEngine::new(engine_config, sink, progress);
    let server = TransportServer::new(engine.clone(), transport_config, outboxes);
    (engine, server)
}
