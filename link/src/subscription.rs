//! Filtered subscriptions against a single relay.
//!
//! Two operating modes over one owned connection each:
//!
//! - **Stream**: a [`Subscription`] handle backed by a background reader
//!   task.  Matching events are forwarded through a bounded channel until
//!   the caller cancels; cancellation retires the subscription with a
//!   best-effort `CLOSE` frame and closes the connection before
//!   [`Subscription::close`] returns.
//! - **Query**: [`run_query`] collects matching events until the relay's
//!   end-of-stored-events marker, the requested limit, or a hard ceiling
//!   — whichever comes first — and always resolves with what it has.
//!
//! Frames are routed by subscription id; a frame tagged with any other id
//! (a stale subscription on a reused relay-side session, or relay
//! confusion) is discarded.

use crate::connection::{RelayConnection, WebSocketStream};
use crate::error::{RelayLinkError, Result};
use crate::event_handlers::{ConnectionError, DisconnectReason, EventHandlers};
use crate::models::{now_ms, ClientFrame, EventPayload, Filter, ReceivedEvent, RelayFrame};
use crate::timeouts::RelayTimeouts;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant as TokioInstant;
use tokio_tungstenite::tungstenite::protocol::Message;

/// Capacity of the channel between the reader task and the consumer.
/// When full, the reader applies back-pressure by pausing reads.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Inbound frames larger than this are discarded unread (4 MiB).
const MAX_TEXT_FRAME_BYTES: usize = 4 << 20;

/// Maximum sleep duration that won't overflow `Instant + Duration`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

static SUBSCRIPTION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a subscription id.
///
/// Timestamp plus a process-wide counter: ids are pairwise distinct for
/// the process lifetime, which subsumes the per-connection uniqueness the
/// protocol requires.
pub(crate) fn next_subscription_id() -> String {
    let counter = SUBSCRIPTION_COUNTER.fetch_add(1, Ordering::Relaxed);
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    format!("sub_{}_{}", micros, counter)
}

/// Spread keepalive pings across subscriptions to avoid synchronized
/// bursts.  Deterministic jitter derived from the subscription id.
fn jitter_keepalive_interval(base: Duration, subscription_id: &str) -> Duration {
    if base.is_zero() {
        return base;
    }
    let base_ms = base.as_millis() as u64;
    if base_ms <= 1 {
        return base;
    }

    // +/-20% jitter window.
    let jitter_span = (base_ms / 5).max(1);
    let mut hasher = DefaultHasher::new();
    subscription_id.hash(&mut hasher);
    let hashed = hasher.finish();

    let offset = (hashed % (2 * jitter_span + 1)) as i64 - jitter_span as i64;
    let jittered_ms = if offset >= 0 {
        base_ms.saturating_add(offset as u64)
    } else {
        base_ms.saturating_sub((-offset) as u64).max(1)
    };

    Duration::from_millis(jittered_ms)
}

// ── Recent-event ring buffer ────────────────────────────────────────────────

/// Bounded ring of the most recently received events across all streaming
/// subscriptions.  The engine retains nothing else.
#[derive(Debug, Clone)]
pub(crate) struct RecentEvents {
    buf: Arc<Mutex<VecDeque<ReceivedEvent>>>,
    capacity: usize,
}

impl RecentEvents {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity,
        }
    }

    pub(crate) fn push(&self, event: ReceivedEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(event);
    }

    pub(crate) fn snapshot(&self) -> Vec<ReceivedEvent> {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        buf.iter().cloned().collect()
    }
}

// ── Streaming mode ──────────────────────────────────────────────────────────

/// A live streaming subscription against one relay.
///
/// Events arrive through [`next`](Subscription::next) in connection
/// order.  The stream ends — `next()` returns `None` — when the caller
/// cancels, the relay closes the connection, or the transport fails;
/// transport trouble is stream end, not an error.
pub struct Subscription {
    subscription_id: String,
    event_rx: mpsc::Receiver<ReceivedEvent>,
    /// Signals the background reader task to retire the subscription.
    /// `None` once consumed by `close()` or `Drop`.
    close_tx: Option<oneshot::Sender<()>>,
    reader_handle: Option<JoinHandle<()>>,
    closed: bool,
}

impl Subscription {
    /// Receive the next event.  Returns `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<ReceivedEvent> {
        if self.closed {
            return None;
        }
        match self.event_rx.recv().await {
            Some(event) => Some(event),
            None => {
                self.closed = true;
                None
            }
        }
    }

    /// The id this subscription was registered under.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Whether the stream has ended or been cancelled.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Cancel the subscription.
    ///
    /// Waits for the reader task to send the `CLOSE` frame (best-effort)
    /// and close the connection, so no socket outlives this call.  After
    /// it returns, `next()` yields `None` — events already in flight are
    /// dropped, never delivered.  Safe to call repeatedly.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Refuse further deliveries first: this also wakes a reader that
        // is blocked on a full event channel, so the await below cannot
        // deadlock against our own back-pressure.
        self.event_rx.close();
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.reader_handle.take() {
            let _ = handle.await;
        }
    }

    /// A subscription whose stream ended before it began (the relay was
    /// unreachable).  The caller sees an immediately-ended stream, the
    /// same shape as a connection lost mid-stream.
    fn already_closed(subscription_id: String) -> Self {
        let (_tx, event_rx) = mpsc::channel(1);
        Self {
            subscription_id,
            event_rx,
            close_tx: None,
            reader_handle: None,
            closed: true,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Best-effort: let the reader task retire the subscription and
        // close the socket.  If close() already ran this is a no-op.
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Open a streaming subscription.
///
/// Caller misuse (bad URL, invalid filter) is returned as an error
/// before any connection is opened.  Transport failure while opening is
/// not an error: it produces an already-ended stream, and the lifecycle
/// handlers carry the reason.
pub(crate) async fn subscribe_stream(
    url: &str,
    filter: Filter,
    timeouts: &RelayTimeouts,
    handlers: EventHandlers,
    recent: RecentEvents,
) -> Result<Subscription> {
    filter.validate()?;
    let subscription_id = next_subscription_id();

    let mut conn = match RelayConnection::open(url, timeouts).await {
        Ok(conn) => conn,
        Err(e @ RelayLinkError::ConfigurationError(_)) => return Err(e),
        Err(e) => {
            log::warn!("[relay-link] subscribe {}: {}", url, e);
            handlers.emit_error(ConnectionError::new(e.to_string(), true));
            handlers.emit_disconnect(DisconnectReason::new(
                "Connection failed before subscribing",
            ));
            return Ok(Subscription::already_closed(subscription_id));
        }
    };

    let req = ClientFrame::Req {
        subscription_id: subscription_id.clone(),
        filter,
    };
    if let Err(e) = conn.send_frame(&req).await {
        log::warn!("[relay-link] subscribe {}: {}", conn.url(), e);
        handlers.emit_error(ConnectionError::new(e.to_string(), true));
        handlers.emit_disconnect(DisconnectReason::new("Connection lost while subscribing"));
        conn.close().await;
        return Ok(Subscription::already_closed(subscription_id));
    }

    handlers.emit_connect();

    let keepalive_interval = if timeouts.keepalive_interval.is_zero() {
        None
    } else {
        Some(jitter_keepalive_interval(
            timeouts.keepalive_interval,
            &subscription_id,
        ))
    };

    let (url, ws) = conn.into_parts();
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (close_tx, close_rx) = oneshot::channel();
    let reader_handle = tokio::spawn(reader_loop(
        ws,
        url,
        subscription_id.clone(),
        event_tx,
        close_rx,
        keepalive_interval,
        handlers,
        recent,
    ));

    Ok(Subscription {
        subscription_id,
        event_rx,
        close_tx: Some(close_tx),
        reader_handle: Some(reader_handle),
        closed: false,
    })
}

/// Best-effort `CLOSE` frame followed by connection teardown.  The relay
/// may already be gone; failures are swallowed.
async fn send_close_and_shutdown(ws: &mut WebSocketStream, subscription_id: &str) {
    let frame = ClientFrame::Close {
        subscription_id: subscription_id.to_string(),
    };
    if let Ok(payload) = frame.to_text() {
        let _ = ws.send(Message::Text(payload.into())).await;
    }
    let _ = ws.close(None).await;
}

/// Background task that owns the WebSocket and forwards matching events
/// through the bounded channel.
#[allow(clippy::too_many_arguments)]
async fn reader_loop(
    mut ws: WebSocketStream,
    url: String,
    subscription_id: String,
    event_tx: mpsc::Sender<ReceivedEvent>,
    close_rx: oneshot::Receiver<()>,
    keepalive_interval: Option<Duration>,
    handlers: EventHandlers,
    recent: RecentEvents,
) {
    tokio::pin!(close_rx);

    let keepalive_dur = keepalive_interval.unwrap_or(FAR_FUTURE);
    let has_keepalive = keepalive_interval.is_some();
    let mut idle_deadline = TokioInstant::now() + keepalive_dur;

    loop {
        let idle_sleep = tokio::time::sleep_until(idle_deadline);
        tokio::pin!(idle_sleep);

        let frame = tokio::select! {
            biased;

            // Highest priority: cancellation from close() / Drop.
            _ = &mut close_rx => {
                send_close_and_shutdown(&mut ws, &subscription_id).await;
                handlers.emit_disconnect(
                    DisconnectReason::with_code("Subscription cancelled by caller", 1000),
                );
                return;
            }

            // Keepalive idle timer.
            _ = &mut idle_sleep, if has_keepalive => {
                if let Err(e) = ws.send(Message::Ping(Bytes::new())).await {
                    log::warn!("[relay-link] {}: keepalive ping failed: {}", url, e);
                    handlers.emit_disconnect(
                        DisconnectReason::new(format!("Keepalive ping failed: {}", e)),
                    );
                    return;
                }
                idle_deadline = TokioInstant::now() + keepalive_dur;
                continue;
            }

            // Normal path: read the next WebSocket frame.
            msg = ws.next() => {
                idle_deadline = TokioInstant::now() + keepalive_dur;
                msg
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                if text.len() > MAX_TEXT_FRAME_BYTES {
                    log::warn!(
                        "[relay-link] {}: frame too large ({} bytes), discarding",
                        url,
                        text.len()
                    );
                    continue;
                }
                match RelayFrame::parse(&text) {
                    Ok(RelayFrame::Event {
                        subscription_id: id,
                        event,
                    }) => {
                        if id != subscription_id {
                            log::debug!(
                                "[relay-link] {}: discarding event for stale subscription '{}'",
                                url,
                                id
                            );
                            continue;
                        }
                        let received = ReceivedEvent {
                            subscription_id: id,
                            endpoint_url: url.clone(),
                            received_at_ms: now_ms(),
                            event,
                        };
                        recent.push(received.clone());
                        if event_tx.send(received).await.is_err() {
                            // Consumer dropped the handle without close();
                            // retire the subscription ourselves.
                            send_close_and_shutdown(&mut ws, &subscription_id).await;
                            return;
                        }
                    }
                    Ok(RelayFrame::Eose { subscription_id: id }) => {
                        if id == subscription_id {
                            log::debug!(
                                "[relay-link] {}: stored replay complete, streaming live",
                                url
                            );
                        }
                    }
                    Ok(RelayFrame::Notice { message }) => {
                        log::warn!("[relay-link] notice from {}: {}", url, message);
                    }
                    Ok(RelayFrame::Ok { .. }) => {}
                    Ok(RelayFrame::Unknown { tag }) => {
                        log::debug!("[relay-link] {}: ignoring '{}' frame", url, tag);
                    }
                    Err(e) => {
                        log::warn!("[relay-link] {}: discarding malformed frame: {}", url, e);
                    }
                }
            }
            Some(Ok(Message::Ping(payload))) => {
                let _ = ws.send(Message::Pong(payload)).await;
            }
            Some(Ok(Message::Pong(_) | Message::Binary(_) | Message::Frame(_))) => {}
            Some(Ok(Message::Close(frame))) => {
                let reason = if let Some(f) = frame {
                    DisconnectReason::with_code(f.reason.to_string(), f.code.into())
                } else {
                    DisconnectReason::new("Relay closed connection")
                };
                handlers.emit_disconnect(reason);
                return;
            }
            Some(Err(e)) => {
                let msg = e.to_string();
                handlers.emit_error(ConnectionError::new(&msg, false));
                handlers.emit_disconnect(DisconnectReason::new(format!(
                    "Connection error: {}",
                    msg
                )));
                return;
            }
            None => {
                handlers.emit_disconnect(DisconnectReason::new("Connection stream ended"));
                return;
            }
        }
    }
}

// ── Query (collecting) mode ─────────────────────────────────────────────────

/// Run a bounded query: collect matching events until the end-of-stored-
/// events marker, the filter's limit, or the configured ceiling.
///
/// Resolves with whatever was collected on every path — transport
/// trouble mid-collection yields a partial result, not an error.  Only
/// caller misuse (bad URL, invalid filter) is an `Err`.
pub(crate) async fn run_query(
    url: &str,
    filter: Filter,
    timeouts: &RelayTimeouts,
) -> Result<Vec<EventPayload>> {
    filter.validate()?;
    let limit = filter.limit.map(|cap| cap as usize);
    let subscription_id = next_subscription_id();

    let mut conn = match RelayConnection::open(url, timeouts).await {
        Ok(conn) => conn,
        Err(e @ RelayLinkError::ConfigurationError(_)) => return Err(e),
        Err(e) => {
            log::warn!("[relay-link] query {}: {}", url, e);
            return Ok(Vec::new());
        }
    };

    let req = ClientFrame::Req {
        subscription_id: subscription_id.clone(),
        filter,
    };
    if let Err(e) = conn.send_frame(&req).await {
        log::warn!("[relay-link] query {}: {}", conn.url(), e);
        conn.close().await;
        return Ok(Vec::new());
    }

    let mut events: Vec<EventPayload> = Vec::new();
    let deadline = TokioInstant::now() + timeouts.query;

    loop {
        match tokio::time::timeout_at(deadline, conn.next_frame()).await {
            Err(_) => {
                log::debug!(
                    "[relay-link] query {}: ceiling reached with {} event(s) and no EOSE",
                    conn.url(),
                    events.len()
                );
                break;
            }
            Ok(Ok(Some(RelayFrame::Event {
                subscription_id: id,
                event,
            }))) => {
                if id != subscription_id {
                    log::debug!(
                        "[relay-link] query {}: discarding event for stale subscription '{}'",
                        conn.url(),
                        id
                    );
                    continue;
                }
                events.push(event);
                if limit.map_or(false, |cap| events.len() >= cap) {
                    break;
                }
            }
            Ok(Ok(Some(RelayFrame::Eose {
                subscription_id: id,
            }))) => {
                if id == subscription_id {
                    break;
                }
            }
            Ok(Ok(Some(RelayFrame::Notice { message }))) => {
                log::warn!("[relay-link] notice from {}: {}", conn.url(), message);
            }
            Ok(Ok(Some(_))) => {}
            Ok(Ok(None)) => {
                log::debug!(
                    "[relay-link] query {}: relay closed with {} event(s) collected",
                    conn.url(),
                    events.len()
                );
                break;
            }
            Ok(Err(e)) => {
                log::warn!(
                    "[relay-link] query {}: {} ({} event(s) collected)",
                    conn.url(),
                    e,
                    events.len()
                );
                break;
            }
        }
    }

    // Retire the subscription before teardown; the relay may already be gone.
    let _ = conn
        .send_frame(&ClientFrame::Close { subscription_id })
        .await;
    conn.close().await;

    Ok(events)
}
