//! Registry-wide probe sweeps.
//!
//! One sweep fans the latency probe and the capability fetch out over
//! every registered endpoint concurrently, waits for all of them to
//! settle, and only then derives the consolidated [`HealthSnapshot`].
//! Fan-out is bounded by the registry size alone; per-endpoint failures
//! never abort the sweep.

use crate::info::fetch_relay_info;
use crate::models::{now_ms, Endpoint, HealthSnapshot};
use crate::probe::probe_endpoint;
use crate::timeouts::RelayTimeouts;
use futures_util::future::join_all;
use std::sync::Arc;

/// Probe every endpoint and compute one snapshot.
///
/// Each endpoint's observed state is written only by its own probe task;
/// the snapshot is computed strictly after every task has settled, so a
/// partial sweep is never exposed.  Callers serialize overlapping sweeps.
pub(crate) async fn run_sweep(
    endpoints: &[Arc<Endpoint>],
    http: &reqwest::Client,
    timeouts: &RelayTimeouts,
) -> HealthSnapshot {
    log::info!("[relay-link] sweeping {} endpoint(s)", endpoints.len());

    let probes = endpoints.iter().map(|endpoint| {
        let endpoint = Arc::clone(endpoint);
        async move {
            endpoint.begin_probe();
            let (report, info) = tokio::join!(
                probe_endpoint(&endpoint.url, timeouts),
                fetch_relay_info(http, &endpoint.url, timeouts),
            );
            let checked_at = now_ms();
            if report.success {
                endpoint.settle_online(report.latency_ms, checked_at);
            } else {
                endpoint.settle_offline(checked_at);
            }
            if let Some(info) = info {
                endpoint.set_info(info);
            }
        }
    });
    join_all(probes).await;

    let snapshot = HealthSnapshot::compute(endpoints, now_ms());
    log::info!(
        "[relay-link] sweep complete: {}/{} online, average latency {:?} ms",
        snapshot.online,
        snapshot.total,
        snapshot.average_latency_ms
    );
    snapshot
}
