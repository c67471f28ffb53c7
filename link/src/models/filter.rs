use crate::error::{RelayLinkError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Subscription filter sent in a `REQ` frame.
///
/// The engine understands `kinds` and `limit`; the remaining standard
/// keys are carried verbatim, and anything else the caller sets lands in
/// `extra` and is passed through to the relay opaquely.
///
/// # Example
///
/// ```rust
/// use relay_link::Filter;
///
/// // Last ten text notes
/// let filter = Filter::new().with_kinds([1]).with_limit(10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Event ids to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    /// Author public keys to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,

    /// Event kinds to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u32>>,

    /// Only events created at or after this Unix timestamp (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,

    /// Only events created at or before this Unix timestamp (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<u64>,

    /// Maximum number of stored events the relay should replay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Additional filter keys passed through opaquely (e.g. `#e`, `#p`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Filter {
    /// Create an empty filter (matches everything the relay will serve).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event kinds to match.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = u32>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Set the replay limit.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the author public keys to match.
    pub fn with_authors(mut self, authors: impl IntoIterator<Item = String>) -> Self {
        self.authors = Some(authors.into_iter().collect());
        self
    }

    /// Set the lower creation-time bound (Unix seconds).
    pub fn with_since(mut self, since: u64) -> Self {
        self.since = Some(since);
        self
    }

    /// Set the upper creation-time bound (Unix seconds).
    pub fn with_until(mut self, until: u64) -> Self {
        self.until = Some(until);
        self
    }

    /// Pass an arbitrary key through to the relay.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Reject filters the engine refuses to send.
    ///
    /// Surfaced synchronously to the caller before any connection is
    /// opened, per the caller-misuse error class.
    pub fn validate(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(RelayLinkError::InvalidFilter(
                "limit must be at least 1 when set".to_string(),
            ));
        }
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(RelayLinkError::InvalidFilter(format!(
                    "since ({}) is later than until ({})",
                    since, until
                )));
            }
        }
        Ok(())
    }
}
