//! The relay-link client: configuration and the engine facade.
//!
//! One [`RelayClient`] owns the endpoint registry, the timeout policy,
//! and the shared HTTP client, and exposes the engine operations the
//! display layer drives: registry sweeps, single-endpoint probes,
//! capability lookups, raw connections, and both subscription modes.

use crate::connection::{normalize_relay_url, RelayConnection};
use crate::error::{RelayLinkError, Result};
use crate::event_handlers::EventHandlers;
use crate::info::fetch_relay_info;
use crate::models::{now_ms, EventPayload, Filter, HealthSnapshot, ReceivedEvent, RelayInformation};
use crate::probe::{self, ProbeReport};
use crate::registry::EndpointRegistry;
use crate::subscription::{self, RecentEvents, Subscription};
use crate::sweep::run_sweep;
use crate::timeouts::RelayTimeouts;
use tokio::sync::Mutex;

/// Default capacity of the recent-events ring buffer.
const DEFAULT_RECENT_CAPACITY: usize = 50;

/// Client engine for probing and exploring relays.
///
/// Use [`RelayClient::builder`] to construct instances with custom
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use relay_link::{Filter, RelayClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RelayClient::builder().build()?;
///
/// // Sweep the whole registry
/// let snapshot = client.probe_all().await;
/// println!("{}/{} online", snapshot.online, snapshot.total);
///
/// // Bounded query against one relay
/// let events = client
///     .query("wss://relay.damus.io", Filter::new().with_kinds([1]).with_limit(10))
///     .await?;
/// println!("{} events", events.len());
/// # Ok(())
/// # }
/// ```
pub struct RelayClient {
    registry: EndpointRegistry,
    timeouts: RelayTimeouts,
    http: reqwest::Client,
    handlers: EventHandlers,
    /// Serializes registry sweeps: an overlapping `probe_all` queues
    /// behind the in-flight one instead of interleaving result merges.
    sweep_guard: Mutex<()>,
    recent: RecentEvents,
}

impl RelayClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> RelayClientBuilder {
        RelayClientBuilder::new()
    }

    /// The endpoint registry this client sweeps.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// The configured timeouts.
    pub fn timeouts(&self) -> &RelayTimeouts {
        &self.timeouts
    }

    /// Probe every registered endpoint concurrently and publish one
    /// consolidated snapshot once all of them have settled.
    ///
    /// Overlapping calls are queued, never interleaved: each sweep's
    /// snapshot reflects only its own probe results.
    pub async fn probe_all(&self) -> HealthSnapshot {
        let _sweep = self.sweep_guard.lock().await;
        run_sweep(self.registry.endpoints(), &self.http, &self.timeouts).await
    }

    /// Probe a single relay.
    ///
    /// If the URL is registered, the endpoint's observed state is settled
    /// from the report, the same way a full sweep would.
    pub async fn probe_endpoint(&self, url: &str) -> Result<ProbeReport> {
        let url = normalize_relay_url(url)?;
        let registered = self.registry.find_by_url(&url);
        if let Some(endpoint) = &registered {
            endpoint.begin_probe();
        }
        let report = probe::probe_endpoint(&url, &self.timeouts).await;
        if let Some(endpoint) = &registered {
            if report.success {
                endpoint.settle_online(report.latency_ms, now_ms());
            } else {
                endpoint.settle_offline(now_ms());
            }
        }
        Ok(report)
    }

    /// Fetch a relay's capability document.
    ///
    /// `None` means the relay serves no document (or it could not be
    /// fetched in time) — that is not an error and says nothing about
    /// the relay being online.
    pub async fn fetch_info(&self, url: &str) -> Result<Option<RelayInformation>> {
        let url = normalize_relay_url(url)?;
        let info = fetch_relay_info(&self.http, &url, &self.timeouts).await;
        if let (Some(endpoint), Some(info)) = (self.registry.find_by_url(&url), &info) {
            endpoint.set_info(info.clone());
        }
        Ok(info)
    }

    /// Open a raw connection to a relay.
    ///
    /// The caller owns the returned handle; dropping it or calling
    /// [`RelayConnection::close`] disconnects.
    pub async fn connect(&self, url: &str) -> Result<RelayConnection> {
        RelayConnection::open(url, &self.timeouts).await
    }

    /// Disconnect a handle obtained from [`connect`](RelayClient::connect).
    pub async fn disconnect(&self, connection: RelayConnection) {
        connection.close().await;
    }

    /// Open a streaming subscription: matching events flow through the
    /// returned handle until it is cancelled or the connection ends.
    pub async fn subscribe_stream(&self, url: &str, filter: Filter) -> Result<Subscription> {
        subscription::subscribe_stream(
            url,
            filter,
            &self.timeouts,
            self.handlers.clone(),
            self.recent.clone(),
        )
        .await
    }

    /// Run a bounded query: collect matching events until the relay's
    /// end-of-stored-events marker, the filter's `limit`, or the
    /// configured ceiling, and resolve with what was collected.
    pub async fn query(&self, url: &str, filter: Filter) -> Result<Vec<EventPayload>> {
        subscription::run_query(url, filter, &self.timeouts).await
    }

    /// The most recently received streaming events, oldest first,
    /// bounded by the configured ring-buffer capacity.
    pub fn recent_events(&self) -> Vec<ReceivedEvent> {
        self.recent.snapshot()
    }
}

/// Builder for [`RelayClient`].
pub struct RelayClientBuilder {
    registry: Option<EndpointRegistry>,
    timeouts: RelayTimeouts,
    handlers: EventHandlers,
    recent_capacity: usize,
}

impl RelayClientBuilder {
    fn new() -> Self {
        Self {
            registry: None,
            timeouts: RelayTimeouts::default(),
            handlers: EventHandlers::new(),
            recent_capacity: DEFAULT_RECENT_CAPACITY,
        }
    }

    /// Set the endpoint registry.  Defaults to the built-in relay list.
    pub fn registry(mut self, registry: EndpointRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the timeout configuration.
    pub fn timeouts(mut self, timeouts: RelayTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Attach connection lifecycle handlers.
    pub fn event_handlers(mut self, handlers: EventHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Set the recent-events ring buffer capacity (0 disables retention).
    pub fn recent_capacity(mut self, capacity: usize) -> Self {
        self.recent_capacity = capacity;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RelayClient> {
        let http = reqwest::Client::builder()
            .connect_timeout(self.timeouts.info)
            .build()
            .map_err(|e| {
                RelayLinkError::InternalError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(RelayClient {
            registry: self
                .registry
                .unwrap_or_else(EndpointRegistry::default_relays),
            timeouts: self.timeouts,
            http,
            handlers: self.handlers,
            sweep_guard: Mutex::new(()),
            recent: RecentEvents::new(self.recent_capacity),
        })
    }
}
