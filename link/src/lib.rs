//! # relay-link: relay probing and protocol-exploration engine
//!
//! A client library for exploring Nostr relays: it opens and manages
//! many concurrent connections to third-party relays, measures
//! connection latency, retrieves NIP-11 capability documents over the
//! companion HTTP channel, issues filtered subscriptions, and aggregates
//! health across an open-ended, unreliable relay population.
//!
//! ## Features
//!
//! - **Registry sweeps**: probe every relay concurrently and publish one
//!   consolidated health snapshot (online counts, latency, per-NIP support)
//! - **Latency probes**: one short-lived connection per relay, fixed ceiling,
//!   guaranteed teardown
//! - **Capability lookup**: NIP-11 documents fetched with
//!   `Accept: application/nostr+json`; absence is not an error
//! - **Subscriptions**: live streaming until cancelled, or bounded queries
//!   that always resolve — with or without an EOSE marker
//! - **Failure-tolerant**: unreachable relays are the steady state; they mark
//!   themselves offline instead of failing a sweep
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relay_link::{Filter, RelayClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RelayClient::builder().build()?;
//!
//!     // Probe the whole registry
//!     let snapshot = client.probe_all().await;
//!     println!("{}/{} relays online", snapshot.online, snapshot.total);
//!
//!     // Stream live text notes from one relay
//!     let mut sub = client
//!         .subscribe_stream("wss://relay.damus.io", Filter::new().with_kinds([1]))
//!         .await?;
//!     while let Some(received) = sub.next().await {
//!         println!("{}: {}", received.event.pubkey, received.event.content);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod event_handlers;
pub mod info;
pub mod models;
pub mod probe;
pub mod registry;
pub mod subscription;
pub mod timeouts;

mod sweep;

// Re-export main types for convenience
pub use client::{RelayClient, RelayClientBuilder};
pub use connection::RelayConnection;
pub use error::{RelayLinkError, Result};
pub use event_handlers::{ConnectionError, DisconnectReason, EventHandlers};
pub use info::fetch_relay_info;
pub use models::{
    ClientFrame, Endpoint, EndpointStatus, EventPayload, Filter, HealthSnapshot, NipSupport,
    ObservedState, PricingClass, ReceivedEvent, RelayFrame, RelayInformation, RelayLimitation,
};
pub use probe::{probe_endpoint, ProbeReport};
pub use registry::EndpointRegistry;
pub use subscription::Subscription;
pub use timeouts::{RelayTimeouts, RelayTimeoutsBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
