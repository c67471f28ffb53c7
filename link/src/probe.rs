//! Short-lived connection probe.
//!
//! Opens one WebSocket per call, measures time to handshake completion,
//! and classifies the endpoint reachable or not.  The connect future is
//! the single settlement point: it resolves ready, resolves with a
//! transport error (which covers remote close before readiness), or is
//! cut off by the ceiling — exactly one of those produces the report.

use crate::timeouts::RelayTimeouts;
use std::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::error::Error as WsError};

/// Outcome of one latency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    /// Time to readiness in milliseconds; 0 when the probe failed.
    pub latency_ms: u64,
    /// Whether the endpoint answered within the ceiling.
    pub success: bool,
}

impl ProbeReport {
    fn offline() -> Self {
        Self {
            latency_ms: 0,
            success: false,
        }
    }
}

/// Probe one endpoint.
///
/// The connection is torn down on every path before the report is
/// returned; the probe itself mutates no shared state — callers settle
/// the endpoint's observed state from the report.
pub async fn probe_endpoint(url: &str, timeouts: &RelayTimeouts) -> ProbeReport {
    let started = Instant::now();
    match tokio::time::timeout(timeouts.probe, connect_async(url)).await {
        Ok(Ok((mut ws, _response))) => {
            // Clamp to 1 ms so an online endpoint always reports a
            // positive latency, even on loopback.
            let latency_ms = (started.elapsed().as_millis() as u64).max(1);
            let _ = ws.close(None).await;
            log::debug!("[relay-link] probe {}: ready in {} ms", url, latency_ms);
            ProbeReport {
                latency_ms,
                success: true,
            }
        }
        Ok(Err(WsError::Http(response))) => {
            log::debug!(
                "[relay-link] probe {}: handshake rejected (HTTP {})",
                url,
                response.status()
            );
            ProbeReport::offline()
        }
        Ok(Err(e)) => {
            log::debug!("[relay-link] probe {}: {}", url, e);
            ProbeReport::offline()
        }
        Err(_) => {
            log::debug!(
                "[relay-link] probe {}: no readiness within {:?}",
                url,
                timeouts.probe
            );
            ProbeReport::offline()
        }
    }
}
