//! Timeout configuration for relay-link operations.
//!
//! Every blocking point in the engine — connection open, first frame
//! arrival, HTTP response arrival — is gated by one of these ceilings.
//! Streaming subscriptions are the only open-ended operation; they end
//! on explicit cancellation.

use std::time::Duration;

/// Timeout configuration for relay-link operations.
///
/// # Examples
///
/// ```rust
/// use relay_link::RelayTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for probing public relays)
/// let timeouts = RelayTimeouts::default();
///
/// // Custom ceilings for a local test relay
/// let timeouts = RelayTimeouts::builder()
///     .probe_timeout(Duration::from_millis(500))
///     .query_timeout(Duration::from_secs(2))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct RelayTimeouts {
    /// Ceiling for a single latency probe (WebSocket handshake included).
    /// Default: 5 seconds.
    pub probe: Duration,

    /// Ceiling for opening a subscription connection.
    /// Default: 5 seconds.
    pub connect: Duration,

    /// Deadline for the NIP-11 capability document fetch.
    /// Default: 5 seconds.
    pub info: Duration,

    /// Hard ceiling for a bounded (collecting) query, applied whether or
    /// not the relay ever sends an EOSE marker.
    /// Default: 10 seconds.
    pub query: Duration,

    /// Keep-alive ping interval for streaming subscriptions.
    /// Set to 0 to disable keep-alive pings.
    /// Default: 30 seconds.
    pub keepalive_interval: Duration,
}

impl Default for RelayTimeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(5),
            connect: Duration::from_secs(5),
            info: Duration::from_secs(5),
            query: Duration::from_secs(10),
            keepalive_interval: Duration::from_secs(30),
        }
    }
}

impl RelayTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> RelayTimeoutsBuilder {
        RelayTimeoutsBuilder::new()
    }

    /// Timeouts suited to a relay on localhost or a LAN.
    pub fn fast() -> Self {
        Self {
            probe: Duration::from_millis(500),
            connect: Duration::from_millis(500),
            info: Duration::from_millis(500),
            query: Duration::from_secs(2),
            keepalive_interval: Duration::from_secs(10),
        }
    }

    /// Check if a duration represents "no timeout" (zero or absurdly large).
    pub fn is_no_timeout(duration: Duration) -> bool {
        duration.is_zero() || duration > Duration::from_secs(86400 * 365)
    }
}

/// Builder for creating custom [`RelayTimeouts`] configurations.
#[derive(Debug, Clone)]
pub struct RelayTimeoutsBuilder {
    timeouts: RelayTimeouts,
}

impl RelayTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: RelayTimeouts::default(),
        }
    }

    /// Set the latency-probe ceiling.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.probe = timeout;
        self
    }

    /// Set the subscription connection-open ceiling.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect = timeout;
        self
    }

    /// Set the capability-fetch deadline.
    pub fn info_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.info = timeout;
        self
    }

    /// Set the bounded-query ceiling.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.query = timeout;
        self
    }

    /// Set the keep-alive ping interval.  Set to 0 to disable.
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.timeouts.keepalive_interval = interval;
        self
    }

    /// Build the timeout configuration.
    pub fn build(self) -> RelayTimeouts {
        self.timeouts
    }
}
