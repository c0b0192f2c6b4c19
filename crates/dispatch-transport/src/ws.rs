//! WebSocket handler for the worker channel (§4.6).
//!
//! Mirrors the corpus's `ws_handler`/`handle_socket` split in
//! `openintent-web::ws`: an upgrade handler hands the socket to a loop that
//! owns it for the connection's lifetime, split into a read half (inbound
//! `FromWorker` frames) and a forwarding task draining the worker's outbox
//! (outbound `ToWorker` frames), so a slow write never blocks reading the
//! next result.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use dispatch_codec::{Codec, FromWorker, JsonCodec};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::state::AppState;

/// Axum handler that upgrades the HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Process a single worker connection end to end: register, pump frames in
/// both directions, then unregister on disconnect.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let worker_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<String>();
    state.outboxes.insert(worker_id, outbox_tx);

    let peer = "worker".to_string(); // axum does not expose the peer addr on the split socket; logged by id instead.
    state.registry.on_connect(worker_id, peer).await;

    let writer = tokio::spawn(async move {
        while let Some(text) = outbox_rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        let inbound = match FromWorker::from_json(&text) {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!(%worker_id, error = %err, "malformed frame from worker");
                continue;
            }
        };

        match inbound {
            FromWorker::Ready => state.registry.on_ready(worker_id).await,
            FromWorker::Result { .. } => match inbound.decode_value() {
                Ok(Some(outer_bytes)) => match JsonCodec.decode::<(u32, Vec<u8>)>(&outer_bytes) {
                    Ok((index, payload)) => state.registry.on_result(worker_id, index, payload).await,
                    Err(err) => tracing::warn!(%worker_id, error = %err, "failed to decode result envelope"),
                },
                Ok(None) => unreachable!("result frames always carry a value"),
                Err(err) => tracing::warn!(%worker_id, error = %err, "failed to base64-decode result value"),
            },
        }
    }

    state.registry.on_disconnect(worker_id).await;
    state.outboxes.remove(&worker_id);
    writer.abort();
    tracing::info!(%worker_id, "worker connection closed");
}
