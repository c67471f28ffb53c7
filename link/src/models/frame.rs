use super::event::EventPayload;
use super::filter::Filter;
use crate::error::{RelayLinkError, Result};
use serde_json::{json, Value};

/// Client-to-relay frames.
///
/// The wire format is a JSON array tagged by its first element, so these
/// are built through `serde_json` rather than derived.
#[derive(Debug, Clone)]
pub enum ClientFrame {
    /// `["REQ", <subscription id>, <filter>]` — open a filtered subscription.
    Req {
        subscription_id: String,
        filter: Filter,
    },
    /// `["CLOSE", <subscription id>]` — retire a subscription.
    Close { subscription_id: String },
}

impl ClientFrame {
    /// Serialize the frame to its wire text.
    pub fn to_text(&self) -> Result<String> {
        let value = match self {
            ClientFrame::Req {
                subscription_id,
                filter,
            } => json!(["REQ", subscription_id, filter]),
            ClientFrame::Close { subscription_id } => json!(["CLOSE", subscription_id]),
        };
        serde_json::to_string(&value).map_err(Into::into)
    }
}

/// Relay-to-client frames.
#[derive(Debug, Clone)]
pub enum RelayFrame {
    /// `["EVENT", <subscription id>, <event>]` — one matching event.
    Event {
        subscription_id: String,
        event: EventPayload,
    },
    /// `["EOSE", <subscription id>]` — end of stored-event replay.
    Eose { subscription_id: String },
    /// `["NOTICE", <message>]` — human-readable relay notice.
    Notice { message: String },
    /// `["OK", <event id>, <accepted>, <message>]` — publish acknowledgement.
    /// Recognized so it never trips the malformed-frame path; this engine
    /// does not publish, so it is only logged.
    Ok {
        event_id: String,
        accepted: bool,
        message: String,
    },
    /// A well-formed frame with a tag this engine does not handle.
    Unknown { tag: String },
}

impl RelayFrame {
    /// Parse one inbound text frame.
    ///
    /// Returns an error only for malformed input (non-JSON, not an array,
    /// missing the tag or a required element); callers discard the unit
    /// and keep reading.  A well-formed frame with an unrecognized tag
    /// parses to [`RelayFrame::Unknown`].
    pub fn parse(text: &str) -> Result<RelayFrame> {
        let elements: Vec<Value> = serde_json::from_str(text)?;
        let tag = elements
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("frame is not a tagged JSON array"))?;

        match tag {
            "EVENT" => {
                let subscription_id = require_str(&elements, 1, "EVENT subscription id")?;
                let event = elements
                    .get(2)
                    .cloned()
                    .ok_or_else(|| malformed("EVENT frame is missing its payload"))?;
                let event: EventPayload = serde_json::from_value(event)?;
                Ok(RelayFrame::Event {
                    subscription_id,
                    event,
                })
            }
            "EOSE" => Ok(RelayFrame::Eose {
                subscription_id: require_str(&elements, 1, "EOSE subscription id")?,
            }),
            "NOTICE" => Ok(RelayFrame::Notice {
                message: elements
                    .get(1)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            "OK" => Ok(RelayFrame::Ok {
                event_id: require_str(&elements, 1, "OK event id")?,
                accepted: elements.get(2).and_then(Value::as_bool).unwrap_or(false),
                message: elements
                    .get(3)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            other => Ok(RelayFrame::Unknown {
                tag: other.to_string(),
            }),
        }
    }
}

fn malformed(what: &str) -> RelayLinkError {
    RelayLinkError::SerializationError(what.to_string())
}

fn require_str(elements: &[Value], index: usize, what: &str) -> Result<String> {
    elements
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(&format!("{} is missing or not a string", what)))
}
