//! Error types for the relay-link engine.

use thiserror::Error;

/// Result type for relay-link operations.
pub type Result<T> = std::result::Result<T, RelayLinkError>;

/// Errors that can occur in the relay-link engine.
///
/// Transport failures and timeouts against third-party relays are the
/// expected steady state and are *not* surfaced through this type on the
/// probing and querying paths — those resolve to "offline" / partial
/// results instead.  This enum covers the failures a caller can act on:
/// misconfiguration, invalid input, and errors on paths where the caller
/// explicitly asked for a live connection.
#[derive(Debug, Error)]
pub enum RelayLinkError {
    /// Network-level failure (DNS, TCP, TLS).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// An operation exceeded its configured deadline.
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// WebSocket handshake or framing failure.
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Invalid client configuration (bad URL, bad scheme, bad registry document).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize an outbound frame or parse an inbound one.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The caller supplied a filter the engine refuses to send.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<serde_json::Error> for RelayLinkError {
    fn from(err: serde_json::Error) -> Self {
        RelayLinkError::SerializationError(err.to_string())
    }
}

impl From<url::ParseError> for RelayLinkError {
    fn from(err: url::ParseError) -> Self {
        RelayLinkError::ConfigurationError(err.to_string())
    }
}
