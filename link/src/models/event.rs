use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One protocol event as carried inside an `EVENT` frame.
///
/// Fields default individually so a relay omitting one does not poison
/// the whole frame; unknown keys are preserved opaquely.  The engine
/// never verifies `sig` — signing and identity are out of scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Event id (hex).
    #[serde(default)]
    pub id: String,

    /// Author public key (hex).
    #[serde(default)]
    pub pubkey: String,

    /// Creation time, Unix seconds.
    #[serde(default)]
    pub created_at: u64,

    /// Event kind.
    #[serde(default)]
    pub kind: u32,

    /// Tag list.
    #[serde(default)]
    pub tags: Vec<Vec<String>>,

    /// Event content.
    #[serde(default)]
    pub content: String,

    /// Signature (hex).  Carried, never checked.
    #[serde(default)]
    pub sig: String,

    /// Unknown keys preserved opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One inbound event tied to the subscription that produced it.
///
/// Transient: handed to the caller and retained by the engine only in the
/// optional bounded ring buffer.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedEvent {
    /// Subscription id the relay tagged this event with.
    pub subscription_id: String,
    /// URL of the relay that sent the event.
    pub endpoint_url: String,
    /// Local receipt time, millis since Unix epoch.
    pub received_at_ms: u64,
    /// The event itself.
    pub event: EventPayload,
}
