use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// NIP-11 relay information document.
///
/// Fetched over the companion HTTP channel with
/// `Accept: application/nostr+json`.  Every key is optional in the wild;
/// unknown keys are preserved opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayInformation {
    /// Relay display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Administrative public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<String>,

    /// Administrative contact (URI or email).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Relay software identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,

    /// Relay software version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Protocol extensions (NIP numbers) the relay supports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_nips: Vec<u16>,

    /// Operating limits the relay enforces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitation: Option<RelayLimitation>,

    /// Retention policy entries, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<Value>,

    /// Unknown keys preserved opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Operating limits advertised in the `limitation` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayLimitation {
    /// Maximum accepted websocket message length, bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_message_length: Option<u64>,

    /// Maximum concurrent subscriptions per connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_subscriptions: Option<u32>,

    /// Maximum filters per subscription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_filters: Option<u32>,

    /// Maximum honored replay limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<u32>,

    /// Maximum accepted subscription id length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_subid_length: Option<u32>,

    /// Whether the relay demands authentication before serving reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,

    /// Whether the relay demands payment before serving writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_required: Option<bool>,

    /// Unknown limitation keys preserved opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
