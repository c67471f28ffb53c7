use super::relay_info::RelayInformation;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Lifecycle status of a relay endpoint.
///
/// `Checking` is only ever observed while a probe for this endpoint is in
/// flight; every probe settles the endpoint to `Online` or `Offline` on
/// all exit paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    Checking,
    Online,
    Offline,
}

/// Pricing class declared for a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PricingClass {
    #[default]
    Free,
    Paid,
}

/// Mutable observed state of an endpoint, updated by probe sweeps.
#[derive(Debug, Clone, Serialize)]
pub struct ObservedState {
    /// Current lifecycle status.
    pub status: EndpointStatus,
    /// Last measured handshake latency in milliseconds.  Present and
    /// positive for online endpoints; absent for offline ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Millis since Unix epoch of the last settled probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_ms: Option<u64>,
    /// Capability document fetched from the relay, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<RelayInformation>,
    /// Protocol extensions (NIP numbers) the relay advertises.
    pub supported_nips: Vec<u16>,
}

impl Default for ObservedState {
    fn default() -> Self {
        Self {
            status: EndpointStatus::Checking,
            latency_ms: None,
            last_checked_ms: None,
            info: None,
            supported_nips: Vec::new(),
        }
    }
}

/// One target relay: an immutable descriptor plus the observed state the
/// probe sweeps maintain.
///
/// Endpoints are shared as `Arc<Endpoint>`; the observed state sits behind
/// an internal lock and is written only by the task that owns the
/// in-flight probe for this endpoint.
#[derive(Debug)]
pub struct Endpoint {
    /// Stable identifier, unique within a registry.
    pub id: String,
    /// Connection address (`wss://…` or `ws://…`).
    pub url: String,
    /// Human-readable display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Location/region tag (e.g. "us-east", "europe").
    pub region: String,
    /// Declared topic tags.
    pub topics: Vec<String>,
    /// Pricing class.
    pub pricing: PricingClass,

    state: RwLock<ObservedState>,
}

impl Endpoint {
    /// Create an endpoint with an empty observed state.
    pub fn new(id: impl Into<String>, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            name: name.into(),
            description: String::new(),
            region: String::new(),
            topics: Vec::new(),
            pricing: PricingClass::Free,
            state: RwLock::new(ObservedState::default()),
        }
    }

    /// Set the free-text description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the location/region tag.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the declared topic tags.
    pub fn with_topics(mut self, topics: impl IntoIterator<Item = String>) -> Self {
        self.topics = topics.into_iter().collect();
        self
    }

    /// Set the pricing class.
    pub fn with_pricing(mut self, pricing: PricingClass) -> Self {
        self.pricing = pricing;
        self
    }

    /// Snapshot the current observed state.
    pub fn observed(&self) -> ObservedState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Mark a probe as in flight.
    pub(crate) fn begin_probe(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.status = EndpointStatus::Checking;
    }

    /// Settle the in-flight probe as successful.
    pub(crate) fn settle_online(&self, latency_ms: u64, checked_at_ms: u64) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.status = EndpointStatus::Online;
        state.latency_ms = Some(latency_ms);
        state.last_checked_ms = Some(checked_at_ms);
    }

    /// Settle the in-flight probe as failed.
    pub(crate) fn settle_offline(&self, checked_at_ms: u64) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.status = EndpointStatus::Offline;
        state.latency_ms = None;
        state.last_checked_ms = Some(checked_at_ms);
    }

    /// Merge a fetched capability document into the observed state.
    ///
    /// Never touches the lifecycle status: absence or staleness of
    /// capability data must not flip an endpoint online or offline.
    pub(crate) fn set_info(&self, info: RelayInformation) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.supported_nips = info.supported_nips.clone();
        state.supported_nips.sort_unstable();
        state.supported_nips.dedup();
        state.info = Some(info);
    }
}
