//! Transport server assembly (§4.6): composes the worker WebSocket router
//! and the asset/package router, and starts both listeners.
//!
//! Modeled on `openintent_web::server::WebServer` -- a struct holding
//! config and shared state, a private `router()` builder, and a `start()`
//! that binds and serves -- but split into two listeners per
//! [`TransportConfig`], since the worker channel and the asset bootstrap
//! endpoint are independently configured ports.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use dispatch_kernel::{DispatchEngine, WorkerRegistry};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::assets;
use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::state::{AppState, Outboxes};
use crate::ws;

/// The dispatch worker transport: a WebSocket listener and an asset
/// listener sharing one [`AppState`].
pub struct TransportServer {
    state: Arc<AppState>,
}

impl TransportServer {
    /// `outboxes` must be the same map handed to the [`crate::sink::TransportSink`]
    /// the engine was constructed with -- see [`crate::build`] for the usual
    /// way to wire this up without juggling it by hand.
    #[must_use]
    pub fn new(engine: DispatchEngine, config: TransportConfig, outboxes: Outboxes) -> Self {
        Self {
            state: AppState::new(engine, config, outboxes),
        }
    }

    /// The worker registry driven by this transport's connections.
    #[must_use]
    pub fn registry(&self) -> WorkerRegistry {
        self.state.registry.clone()
    }

    fn ws_router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws::ws_handler))
            .with_state(Arc::clone(&self.state))
    }

    fn asset_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin("*".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET])
            .allow_headers(tower_http::cors::Any);

        Router::new()
            .route("/packages", get(assets::packages))
            .route("/", get(assets::index_redirect))
            .fallback_service(ServeDir::new(&self.state.config.assets_dir))
            .layer(cors)
            .with_state(Arc::clone(&self.state))
    }

    /// Bind both listeners and start serving. Returns a handle that shuts
    /// both down gracefully when asked (§5's explicit `shutdown().await`).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Bind`] if either port cannot be bound.
    pub async fn start(&self) -> Result<TransportHandle> {
        let transport_addr = self.state.config.transport_addr();
        let asset_addr = self.state.config.asset_addr();

        let ws_listener = TcpListener::bind(&transport_addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: transport_addr.clone(),
                source,
            })?;
        let asset_listener = TcpListener::bind(&asset_addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: asset_addr.clone(),
                source,
            })?;

        tracing::info!(addr = %transport_addr, "worker transport listening");
        tracing::info!(addr = %asset_addr, "asset server listening");

        let shutdown = Arc::new(Notify::new());

        let ws_router = self.ws_router();
        let ws_shutdown = Arc::clone(&shutdown);
        let ws_task = tokio::spawn(async move {
            let _ = axum::serve(ws_listener, ws_router)
                .with_graceful_shutdown(async move { ws_shutdown.notified().await })
                .await;
        });

        let asset_router = self.asset_router();
        let asset_shutdown = Arc::clone(&shutdown);
        let asset_task = tokio::spawn(async move {
            let _ = axum::serve(asset_listener, asset_router)
                .with_graceful_shutdown(async move { asset_shutdown.notified().await })
                .await;
        });

        Ok(TransportHandle {
            ws_task,
            asset_task,
            shutdown,
        })
    }
}

/// A running transport instance. Dropping this without calling
/// [`TransportHandle::shutdown`] leaves both listeners running until the
/// process exits -- callers are expected to shut down explicitly on every
/// exit path, matching §5's guard-plus-explicit-await pattern.
pub struct TransportHandle {
    ws_task: JoinHandle<()>,
    asset_task: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

impl TransportHandle {
    /// Signal both listeners to stop accepting new connections, finish
    /// in-flight requests, and wait for both to exit.
    pub async fn shutdown(self) {
        self.shutdown.notify_waiters();
        let _ = tokio::join!(self.ws_task, self.asset_task);
        tracing::info!("transport shut down");
    }
}
