//! Integration tests for both subscription modes against in-process
//! mock relays: bounded queries (EOSE, limit, ceiling, partial results)
//! and streaming with cancellation.

use relay_link::{EventHandlers, Filter, RelayClient, RelayTimeouts};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

mod common;
use common::{spawn_relay, wait_until, Behavior};

fn test_timeouts() -> RelayTimeouts {
    RelayTimeouts::builder()
        .probe_timeout(Duration::from_millis(400))
        .connect_timeout(Duration::from_millis(400))
        .info_timeout(Duration::from_millis(400))
        .query_timeout(Duration::from_millis(800))
        .build()
}

fn test_client() -> RelayClient {
    RelayClient::builder()
        .timeouts(test_timeouts())
        .build()
        .unwrap()
}

async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

// ── Query mode ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_collects_events_until_eose_in_arrival_order() {
    let relay = spawn_relay(Behavior::StoredEvents { count: 10 }).await;
    let events = test_client()
        .query(&relay.url, Filter::new().with_kinds([1]).with_limit(10))
        .await
        .unwrap();

    assert_eq!(events.len(), 10);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.content, format!("note {}", i));
        assert_eq!(event.kind, 1);
    }
}

#[tokio::test]
async fn query_caps_results_at_the_filter_limit() {
    let relay = spawn_relay(Behavior::StoredEvents { count: 10 }).await;
    let events = test_client()
        .query(&relay.url, Filter::new().with_limit(4))
        .await
        .unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[3].content, "note 3");
}

#[tokio::test]
async fn query_without_eose_resolves_at_the_ceiling_with_partials() {
    let relay = spawn_relay(Behavior::NoEose { count: 3 }).await;
    let started = Instant::now();
    let events = test_client()
        .query(&relay.url, Filter::new().with_limit(10))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(events.len(), 3);
    assert!(elapsed >= Duration::from_millis(800), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1600), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn query_against_mute_relay_resolves_empty() {
    let relay = spawn_relay(Behavior::Mute).await;
    let events = test_client()
        .query(&relay.url, Filter::new())
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn query_discards_frames_for_foreign_subscription_ids() {
    let relay = spawn_relay(Behavior::WrongSubId { count: 4 }).await;
    let events = test_client()
        .query(&relay.url, Filter::new())
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn query_skips_malformed_frames_and_keeps_the_rest() {
    let relay = spawn_relay(Behavior::MalformedThenStored { count: 2 }).await;
    let events = test_client()
        .query(&relay.url, Filter::new())
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn query_against_unreachable_relay_resolves_empty_not_err() {
    let url = refused_url().await;
    let events = test_client().query(&url, Filter::new()).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn query_rejects_invalid_filter_before_connecting() {
    let result = test_client()
        .query("wss://relay.example.com", Filter::new().with_limit(0))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn query_sends_close_frame_on_completion() {
    let relay = spawn_relay(Behavior::StoredEvents { count: 1 }).await;
    test_client()
        .query(&relay.url, Filter::new())
        .await
        .unwrap();
    let state = Arc::clone(&relay.state);
    assert!(
        wait_until(Duration::from_secs(1), || {
            state.closes.load(Ordering::SeqCst) >= 1
        })
        .await,
        "relay never saw the CLOSE frame"
    );
}

// ── Stream mode ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn stream_delivers_events_in_order_with_matching_subscription_id() {
    let relay = spawn_relay(Behavior::NoEose { count: 3 }).await;
    let client = test_client();
    let mut sub = client
        .subscribe_stream(&relay.url, Filter::new().with_kinds([1]))
        .await
        .unwrap();

    for i in 0..3 {
        let received = tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .expect("event in time")
            .expect("stream alive");
        assert_eq!(received.event.content, format!("note {}", i));
        assert_eq!(received.subscription_id, sub.subscription_id());
        assert_eq!(received.endpoint_url, relay.url);
    }

    sub.close().await;
}

#[tokio::test]
async fn cancelled_stream_delivers_nothing_and_closes_the_connection() {
    let relay = spawn_relay(Behavior::NoEose { count: 3 }).await;
    let client = test_client();
    let mut sub = client
        .subscribe_stream(&relay.url, Filter::new())
        .await
        .unwrap();

    for _ in 0..3 {
        tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .expect("event in time")
            .expect("stream alive");
    }

    sub.close().await;
    assert!(sub.is_closed());

    // Nothing reaches the caller after cancellation, even if the relay
    // keeps talking.
    assert!(sub.next().await.is_none());

    // The relay saw the subscription retired and the connection closed.
    let state = Arc::clone(&relay.state);
    assert!(
        wait_until(Duration::from_secs(1), || {
            state.closes.load(Ordering::SeqCst) >= 1
                && state.disconnects.load(Ordering::SeqCst) >= 1
        })
        .await,
        "relay never observed the teardown"
    );
}

#[tokio::test]
async fn stream_against_unreachable_relay_ends_immediately() {
    let url = refused_url().await;
    let errors = Arc::new(AtomicUsize::new(0));
    let disconnects = Arc::new(AtomicUsize::new(0));
    let errors_clone = Arc::clone(&errors);
    let disconnects_clone = Arc::clone(&disconnects);

    let client = RelayClient::builder()
        .timeouts(test_timeouts())
        .event_handlers(
            EventHandlers::new()
                .on_error(move |_| {
                    errors_clone.fetch_add(1, Ordering::SeqCst);
                })
                .on_disconnect(move |_| {
                    disconnects_clone.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .build()
        .unwrap();

    let mut sub = client.subscribe_stream(&url, Filter::new()).await.unwrap();
    assert!(sub.is_closed());
    assert!(sub.next().await.is_none());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stream_rejects_invalid_url_synchronously() {
    let client = test_client();
    assert!(client
        .subscribe_stream("https://not-a-relay.example.com", Filter::new())
        .await
        .is_err());
}

#[tokio::test]
async fn connect_returns_an_owned_handle_and_disconnect_closes_it() {
    let relay = spawn_relay(Behavior::Mute).await;
    let client = test_client();

    let conn = client.connect(&relay.url).await.unwrap();
    assert_eq!(conn.url(), relay.url);

    client.disconnect(conn).await;
    let state = Arc::clone(&relay.state);
    assert!(
        wait_until(Duration::from_secs(1), || {
            state.disconnects.load(Ordering::SeqCst) >= 1
        })
        .await,
        "relay never observed the disconnect"
    );
}

#[tokio::test]
async fn recent_events_ring_buffer_keeps_the_newest() {
    let relay = spawn_relay(Behavior::NoEose { count: 3 }).await;
    let client = RelayClient::builder()
        .timeouts(test_timeouts())
        .recent_capacity(2)
        .build()
        .unwrap();

    let mut sub = client
        .subscribe_stream(&relay.url, Filter::new())
        .await
        .unwrap();
    for _ in 0..3 {
        tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .expect("event in time")
            .expect("stream alive");
    }
    sub.close().await;

    let recent = client.recent_events();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].event.content, "note 1");
    assert_eq!(recent[1].event.content, "note 2");
}

#[tokio::test]
async fn lifecycle_handlers_fire_for_a_full_stream() {
    let relay = spawn_relay(Behavior::NoEose { count: 1 }).await;
    let connects = Arc::new(AtomicUsize::new(0));
    let disconnects = Arc::new(AtomicUsize::new(0));
    let connects_clone = Arc::clone(&connects);
    let disconnects_clone = Arc::clone(&disconnects);

    let client = RelayClient::builder()
        .timeouts(test_timeouts())
        .event_handlers(
            EventHandlers::new()
                .on_connect(move || {
                    connects_clone.fetch_add(1, Ordering::SeqCst);
                })
                .on_disconnect(move |_| {
                    disconnects_clone.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .build()
        .unwrap();

    let mut sub = client
        .subscribe_stream(&relay.url, Filter::new())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), sub.next())
        .await
        .expect("event in time")
        .expect("stream alive");
    sub.close().await;

    assert_eq!(connects.load(Ordering::SeqCst), 1);
    assert!(
        wait_until(Duration::from_secs(1), || {
            disconnects.load(Ordering::SeqCst) == 1
        })
        .await
    );
}
