use super::endpoint::{Endpoint, EndpointStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Support for one protocol extension across the online population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NipSupport {
    /// Number of online endpoints advertising the extension.
    pub supporting: usize,
    /// Fraction of online endpoints advertising it, in `[0, 1]`.
    pub fraction: f64,
}

/// Consolidated health of the whole endpoint registry at one instant.
///
/// Derived from the endpoints' observed states; recomputed per sweep and
/// never stored independently of them.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Total endpoints swept.
    pub total: usize,
    /// Endpoints that answered the probe.
    pub online: usize,
    /// Endpoints that did not.
    pub offline: usize,
    /// Mean latency over online endpoints with a positive measurement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_latency_ms: Option<u64>,
    /// Union of advertised NIPs across online endpoints, with the
    /// fraction of the online population supporting each.
    pub nip_support: BTreeMap<u16, NipSupport>,
    /// Millis since Unix epoch when the snapshot was taken.
    pub taken_at_ms: u64,
}

impl HealthSnapshot {
    /// Compute a snapshot from the endpoints' current observed states.
    pub fn compute(endpoints: &[Arc<Endpoint>], taken_at_ms: u64) -> Self {
        let mut online = 0usize;
        let mut offline = 0usize;
        let mut latency_sum = 0u64;
        let mut latency_count = 0u64;
        let mut nip_counts: BTreeMap<u16, usize> = BTreeMap::new();

        for endpoint in endpoints {
            let state = endpoint.observed();
            match state.status {
                EndpointStatus::Online => {
                    online += 1;
                    if let Some(latency) = state.latency_ms.filter(|ms| *ms > 0) {
                        latency_sum += latency;
                        latency_count += 1;
                    }
                    for nip in &state.supported_nips {
                        *nip_counts.entry(*nip).or_default() += 1;
                    }
                }
                EndpointStatus::Offline | EndpointStatus::Checking => {
                    // A sweep settles every endpoint before computing its
                    // snapshot; Checking here means no sweep has run yet.
                    offline += 1;
                }
            }
        }

        let average_latency_ms = if latency_count > 0 {
            Some(latency_sum / latency_count)
        } else {
            None
        };

        let nip_support = nip_counts
            .into_iter()
            .map(|(nip, supporting)| {
                (
                    nip,
                    NipSupport {
                        supporting,
                        fraction: supporting as f64 / online as f64,
                    },
                )
            })
            .collect();

        Self {
            total: endpoints.len(),
            online,
            offline,
            average_latency_ms,
            nip_support,
            taken_at_ms,
        }
    }
}
