//! In-process mock relays for integration tests.
//!
//! Each mock binds a loopback listener and serves scripted behavior:
//! WebSocket upgrades get the configured frame script, plain HTTP GETs
//! get the configured capability document (or a 404).  Tests run with
//! shortened ceilings; the semantics under test are identical to the
//! production defaults.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;

/// How a mock relay answers a `REQ`.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Send `count` stored events, then EOSE, then hold the connection open.
    StoredEvents { count: usize },
    /// Send `count` events and never send EOSE; hold the connection open.
    NoEose { count: usize },
    /// Send `count` events tagged with a foreign subscription id, then a
    /// correctly-tagged EOSE.
    WrongSubId { count: usize },
    /// Send one non-JSON text frame, then `count` events, then EOSE.
    MalformedThenStored { count: usize },
    /// Accept the WebSocket and never answer anything.
    Mute,
    /// Accept TCP but never complete the WebSocket handshake.
    BlackHole,
}

/// Counters recording what the relay side observed.
#[derive(Debug, Default)]
pub struct RelayState {
    /// `REQ` frames received.
    pub reqs: AtomicUsize,
    /// `CLOSE` frames received.
    pub closes: AtomicUsize,
    /// Connections that ended (close frame, error, or EOF).
    pub disconnects: AtomicUsize,
}

pub struct MockRelay {
    /// `ws://…` URL of the listener.
    pub url: String,
    pub state: Arc<RelayState>,
    accept_task: JoinHandle<()>,
}

impl Drop for MockRelay {
    fn drop(&mut self) {
        // Stop accepting so a dropped relay reads as unreachable.
        self.accept_task.abort();
    }
}

/// Spawn a mock relay with the given WebSocket behavior and no
/// capability document.
pub async fn spawn_relay(behavior: Behavior) -> MockRelay {
    spawn_relay_with(behavior, None).await
}

/// Spawn a mock relay that also serves `info` as its NIP-11 document on
/// plain HTTP GETs.
pub async fn spawn_relay_with(behavior: Behavior, info: Option<Value>) -> MockRelay {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock relay");
    let addr = listener.local_addr().expect("mock relay addr");
    let state = Arc::new(RelayState::default());

    let task_state = Arc::clone(&state);
    let accept_task = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let behavior = behavior.clone();
            let info = info.clone();
            let state = Arc::clone(&task_state);
            tokio::spawn(serve_connection(stream, behavior, info, state));
        }
    });

    MockRelay {
        url: format!("ws://{}", addr),
        state,
        accept_task,
    }
}

/// Fabricate one deterministic event payload.
pub fn make_event(index: usize) -> Value {
    json!({
        "id": format!("event-{:04}", index),
        "pubkey": "f".repeat(64),
        "created_at": 1_700_000_000u64 + index as u64,
        "kind": 1,
        "tags": [],
        "content": format!("note {}", index),
        "sig": "0".repeat(128),
    })
}

/// Poll `cond` every 10 ms until it holds or `deadline` passes.
pub async fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let end = tokio::time::Instant::now() + deadline;
    while tokio::time::Instant::now() < end {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

async fn serve_connection(
    mut stream: TcpStream,
    behavior: Behavior,
    info: Option<Value>,
    state: Arc<RelayState>,
) {
    if matches!(behavior, Behavior::BlackHole) {
        // Swallow whatever the client sends and never reply; the socket
        // stays open until the client gives up.
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    }

    // Sniff the request head: WebSocket upgrades get the frame script,
    // anything else is treated as a capability document fetch.  Peek
    // until the header block is complete so a partial first segment
    // cannot misclassify the request.
    let mut head = [0u8; 2048];
    let mut head_text = String::new();
    for _ in 0..100 {
        let Ok(n) = stream.peek(&mut head).await else {
            return;
        };
        head_text = String::from_utf8_lossy(&head[..n]).to_ascii_lowercase();
        if head_text.contains("\r\n\r\n") || n == head.len() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    if !head_text.contains("upgrade: websocket") {
        serve_info_request(stream, info).await;
        return;
    }

    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };

    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                let Ok(frame) = serde_json::from_str::<Vec<Value>>(&text) else {
                    continue;
                };
                match frame.first().and_then(Value::as_str) {
                    Some("REQ") => {
                        state.reqs.fetch_add(1, Ordering::SeqCst);
                        let Some(sub_id) = frame.get(1).and_then(Value::as_str) else {
                            continue;
                        };
                        let sub_id = sub_id.to_string();
                        if run_req_script(&mut ws, &behavior, &sub_id).await.is_err() {
                            state.disconnects.fetch_add(1, Ordering::SeqCst);
                            return;
                        }
                    }
                    Some("CLOSE") => {
                        state.closes.fetch_add(1, Ordering::SeqCst);
                    }
                    _ => {}
                }
            }
            Some(Ok(Message::Ping(payload))) => {
                let _ = ws.send(Message::Pong(payload)).await;
            }
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                state.disconnects.fetch_add(1, Ordering::SeqCst);
                return;
            }
            Some(Ok(_)) => {}
        }
    }
}

type Ws = tokio_tungstenite::WebSocketStream<TcpStream>;

async fn send_json(ws: &mut Ws, value: Value) -> Result<(), ()> {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .map_err(|_| ())
}

async fn run_req_script(ws: &mut Ws, behavior: &Behavior, sub_id: &str) -> Result<(), ()> {
    match behavior {
        Behavior::StoredEvents { count } => {
            for i in 0..*count {
                send_json(ws, json!(["EVENT", sub_id, make_event(i)])).await?;
            }
            send_json(ws, json!(["EOSE", sub_id])).await?;
        }
        Behavior::NoEose { count } => {
            for i in 0..*count {
                send_json(ws, json!(["EVENT", sub_id, make_event(i)])).await?;
            }
        }
        Behavior::WrongSubId { count } => {
            for i in 0..*count {
                send_json(ws, json!(["EVENT", "someone-elses-sub", make_event(i)])).await?;
            }
            send_json(ws, json!(["EOSE", sub_id])).await?;
        }
        Behavior::MalformedThenStored { count } => {
            ws.send(Message::Text("this is not a frame".to_string().into()))
                .await
                .map_err(|_| ())?;
            for i in 0..*count {
                send_json(ws, json!(["EVENT", sub_id, make_event(i)])).await?;
            }
            send_json(ws, json!(["EOSE", sub_id])).await?;
        }
        Behavior::Mute => {}
        Behavior::BlackHole => unreachable!("BlackHole never reaches the WebSocket layer"),
    }
    Ok(())
}

/// Serve one plain HTTP request: the capability document when one is
/// configured, a 404 otherwise.
async fn serve_info_request(mut stream: TcpStream, info: Option<Value>) {
    // Drain the request head.
    let mut buf = [0u8; 2048];
    let mut total = Vec::new();
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                total.extend_from_slice(&buf[..n]);
                if total.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    let response = match info {
        Some(document) => {
            let body = document.to_string();
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/nostr+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
        }
        None => {
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
        }
    };
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
