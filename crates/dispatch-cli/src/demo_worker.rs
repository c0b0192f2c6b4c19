//! In-process worker stub speaking the exact wire protocol (§1, §6).
//!
//! No sandboxed worker runtime ships with this crate -- executing the
//! caller's `f` is explicitly out of scope. This stub stands in for one: it
//! connects like any real worker, answers `ready`, and for every `data`
//! frame it receives, decodes an `i32` and replies with its square. Grounded
//! on `openintent-adapters::browser`'s `connect_async`/`split`/`send`/`next`
//! WebSocket client idiom.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use dispatch_codec::{Codec, JsonCodec};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// Connect to `ws://{addr}/ws`, announce readiness, and square every `i32`
/// task it is handed until the connection closes.
pub async fn run_squaring_worker(addr: &str, name: &str) -> Result<()> {
    let url = format!("ws://{addr}/ws");
    let (ws_stream, _response) = connect_async(&url).await.context("worker failed to connect")?;
    let (mut sink, mut stream) = ws_stream.split();

    info!(worker = name, %url, "demo worker connected");
    sink.send(Message::Text(r#"{"type":"ready"}"#.into()))
        .await
        .context("worker failed to send ready")?;

    while let Some(msg) = stream.next().await {
        let msg = msg.context("worker websocket error")?;
        let Message::Text(text) = msg else { continue };

        let frame: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(err) => {
                warn!(worker = name, error = %err, "worker received malformed frame");
                continue;
            }
        };

        match frame["type"].as_str() {
            Some("function") => info!(worker = name, "received function blob"),
            Some("data") => {
                let Some(value) = frame["value"].as_str() else {
                    continue;
                };
                if let Err(err) = handle_task(&mut sink, value).await {
                    warn!(worker = name, error = %err, "worker failed to handle task");
                }
            }
            other => warn!(worker = name, ?other, "unexpected frame type"),
        }
    }

    info!(worker = name, "demo worker disconnected");
    Ok(())
}

async fn handle_task<S>(sink: &mut S, value: &str) -> Result<()>
where
    S: futures::Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let outer = BASE64.decode(value).context("task value is not valid base64")?;
    let (index, payload): (u32, Vec<u8>) = JsonCodec.decode(&outer).context("task envelope is not valid")?;
    let input: i32 = JsonCodec.decode(&payload).context("task payload is not an i32")?;

    let result_bytes = JsonCodec.encode(&(input * input))?;
    let envelope = JsonCodec.encode(&(index, result_bytes))?;
    let reply = serde_json::json!({
        "type": "result",
        "value": BASE64.encode(envelope),
    });

    sink.send(Message::Text(reply.to_string().into()))
        .await
        .context("worker failed to send result")?;
    Ok(())
}
