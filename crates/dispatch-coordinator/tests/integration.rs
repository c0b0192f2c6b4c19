// ═══ End-to-end map() scenarios (§8) ═══
//
// Drives a real Coordinator against a real axum WebSocket listener with an
// in-process worker stub speaking the exact wire protocol, the way
// `openintent-adapters::browser` drives a real CDP WebSocket with
// `tokio_tungstenite::connect_async`. No real sandboxed worker ships with
// this crate (out of scope), so the stub stands in for one in every test.

use std::time::Duration;

use dispatch_codec::{Codec, JsonCodec};
use dispatch_coordinator::{Coordinator, SessionConfig};
use dispatch_transport::TransportConfig;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

fn config(transport_port: u16, asset_port: u16) -> SessionConfig {
    SessionConfig {
        transport: TransportConfig {
            bind_addr: "127.0.0.1".into(),
            transport_port,
            asset_port,
            ..Default::default()
        },
        timeout_seconds: 5,
        chunk_size: 1,
        max_attempts: None,
    }
}

/// Connects, sends `ready`, then answers every `data` frame it receives by
/// squaring the decoded `i32` input, until the connection closes.
async fn run_squaring_worker(transport_port: u16) {
    let url = format!("ws://127.0.0.1:{transport_port}/ws");
    let (ws_stream, _response) = connect_async(&url).await.expect("worker connects");
    let (mut sink, mut stream) = ws_stream.split();

    sink.send(Message::Text(r#"{"type":"ready"}"#.into()))
        .await
        .expect("send ready");

    while let Some(Ok(msg)) = stream.next().await {
        let Message::Text(text) = msg else { continue };
        let frame: Value = serde_json::from_str(&text).expect("valid json frame");
        match frame["type"].as_str() {
            Some("function") => {}
            Some("data") => {
                let value = frame["value"].as_str().unwrap();
                let outer = base64_decode(value);
                let (index, payload): (u32, Vec<u8>) = JsonCodec.decode(&outer).unwrap();
                let input: i32 = JsonCodec.decode(&payload).unwrap();
                let result_bytes = JsonCodec.encode(&(input * input)).unwrap();
                let envelope = JsonCodec.encode(&(index, result_bytes)).unwrap();
                let reply = serde_json::json!({
                    "type": "result",
                    "value": base64_encode(&envelope),
                });
                sink.send(Message::Text(reply.to_string().into())).await.expect("send result");
            }
            _ => {}
        }
    }
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn base64_decode(text: &str) -> Vec<u8> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(text).unwrap()
}

#[tokio::test]
async fn single_worker_squares_every_input_in_order() {
    let coordinator = Coordinator::new(config(18710, 18711));
    let f_blob = JsonCodec.encode(&"square").unwrap();
    let inputs: Vec<i32> = (1..=20).collect();

    // Spawn the session first so the listener is bound before the worker
    // ever tries to connect -- otherwise `connect_async` races a socket
    // nothing is listening on yet.
    let map_call = {
        let inputs = inputs.clone();
        tokio::spawn(async move { coordinator.map(f_blob, inputs, 4).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let worker = tokio::spawn(run_squaring_worker(18710));

    let results: Vec<i32> = map_call.await.unwrap().unwrap();

    let expected: Vec<i32> = inputs.iter().map(|i| i * i).collect();
    assert_eq!(results, expected);

    worker.abort();
}

#[tokio::test]
async fn empty_input_completes_without_any_worker() {
    let coordinator = Coordinator::new(config(18712, 18713));
    let f_blob = JsonCodec.encode(&"square").unwrap();

    let results: Vec<i32> = coordinator.map(f_blob, Vec::<i32>::new(), 1).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn late_joining_worker_still_completes_the_session() {
    let coordinator = Coordinator::new(config(18714, 18715));
    let f_blob = JsonCodec.encode(&"square").unwrap();

    let inputs = vec![2, 3, 4];
    let map_call = tokio::spawn(async move { coordinator.map(f_blob, inputs, 1).await });

    // Worker connects only after the session has already started.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let worker = tokio::spawn(run_squaring_worker(18714));

    let results: Vec<i32> = map_call.await.unwrap().unwrap();
    assert_eq!(results, vec![4, 9, 16]);

    worker.abort();
}
