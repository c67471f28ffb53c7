//! Connection lifecycle event handlers.
//!
//! Callback-based hooks the display layer can attach to monitor what the
//! engine's connections are doing:
//!
//! - [`on_connect`](EventHandlers::on_connect): fired when a subscription connection is established
//! - [`on_disconnect`](EventHandlers::on_disconnect): fired when a subscription connection closes
//! - [`on_error`](EventHandlers::on_error): fired on connection or protocol errors
//!
//! # Example
//!
//! ```rust
//! use relay_link::EventHandlers;
//!
//! let handlers = EventHandlers::new()
//!     .on_connect(|| println!("connected"))
//!     .on_disconnect(|reason| println!("disconnected: {}", reason))
//!     .on_error(|error| eprintln!("error: {}", error));
//! ```

use std::fmt;
use std::sync::Arc;

/// Reason for a disconnect event.
#[derive(Debug, Clone)]
pub struct DisconnectReason {
    /// Human-readable description of why the connection closed.
    pub message: String,
    /// WebSocket close code, if available (e.g. 1000 = normal, 1006 = abnormal).
    pub code: Option<u16>,
}

impl DisconnectReason {
    /// Create a new disconnect reason with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Create a new disconnect reason with a message and close code.
    pub fn with_code(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "{} (code: {})", self.message, code)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// Error information passed to the `on_error` handler.
#[derive(Debug, Clone)]
pub struct ConnectionError {
    /// Human-readable error message.
    pub message: String,
    /// Whether the operation that failed may succeed if retried.
    pub recoverable: bool,
}

impl ConnectionError {
    /// Create a new connection error.
    pub fn new(message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            message: message.into(),
            recoverable,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

type ConnectHandler = Arc<dyn Fn() + Send + Sync>;
type DisconnectHandler = Arc<dyn Fn(DisconnectReason) + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(ConnectionError) + Send + Sync>;

/// Connection lifecycle hooks, all optional.
#[derive(Clone, Default)]
pub struct EventHandlers {
    connect: Option<ConnectHandler>,
    disconnect: Option<DisconnectHandler>,
    error: Option<ErrorHandler>,
}

impl EventHandlers {
    /// Create an empty handler set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler fired when a connection is established.
    pub fn on_connect(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.connect = Some(Arc::new(handler));
        self
    }

    /// Attach a handler fired when a connection closes.
    pub fn on_disconnect(
        mut self,
        handler: impl Fn(DisconnectReason) + Send + Sync + 'static,
    ) -> Self {
        self.disconnect = Some(Arc::new(handler));
        self
    }

    /// Attach a handler fired on connection or protocol errors.
    pub fn on_error(mut self, handler: impl Fn(ConnectionError) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(handler));
        self
    }

    pub(crate) fn emit_connect(&self) {
        if let Some(handler) = &self.connect {
            handler();
        }
    }

    pub(crate) fn emit_disconnect(&self, reason: DisconnectReason) {
        if let Some(handler) = &self.disconnect {
            handler(reason);
        }
    }

    pub(crate) fn emit_error(&self, error: ConnectionError) {
        if let Some(handler) = &self.error {
            handler(error);
        }
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("connect", &self.connect.is_some())
            .field("disconnect", &self.disconnect.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
