//! Data models for the relay-link engine.
//!
//! Defines the endpoint registry entries and their observed state, the
//! wire frames exchanged with relays, filter and event payloads, the
//! NIP-11 capability document, and the aggregated health snapshot.

pub mod endpoint;
pub mod event;
pub mod filter;
pub mod frame;
pub mod relay_info;
pub mod snapshot;

pub use endpoint::{Endpoint, EndpointStatus, ObservedState, PricingClass};
pub use event::{EventPayload, ReceivedEvent};
pub use filter::Filter;
pub use frame::{ClientFrame, RelayFrame};
pub use relay_info::{RelayInformation, RelayLimitation};
pub use snapshot::{HealthSnapshot, NipSupport};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in millis since Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
