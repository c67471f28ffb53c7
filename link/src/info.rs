//! NIP-11 capability document fetch.
//!
//! A companion request to the relay's host with the socket scheme
//! translated to HTTP (`wss` → `https`, `ws` → `http`), path `/`, and
//! `Accept: application/nostr+json`.  Absence of a document — timeout,
//! non-success status, or an unparseable body — is not an error state
//! for the endpoint: the fetch resolves to `None` and the caller simply
//! has no capability data to show.

use crate::error::{RelayLinkError, Result};
use crate::models::RelayInformation;
use crate::timeouts::RelayTimeouts;
use reqwest::header::ACCEPT;
use std::time::Instant;
use url::Url;

/// Media type identifying the capability document format.
const NOSTR_JSON: &str = "application/nostr+json";

/// Translate a relay socket URL to its capability document URL.
pub(crate) fn info_url(relay_url: &str) -> Result<Url> {
    let mut url = Url::parse(relay_url.trim())?;
    let scheme = match url.scheme() {
        "wss" => "https",
        "ws" => "http",
        other => {
            return Err(RelayLinkError::ConfigurationError(format!(
                "Unsupported relay scheme '{}'; expected ws or wss",
                other
            )));
        }
    };
    url.set_scheme(scheme).map_err(|_| {
        RelayLinkError::ConfigurationError("Failed to translate relay scheme".to_string())
    })?;
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Fetch the capability document for one relay.
///
/// Runs independently of the latency probe; callers run the two
/// concurrently per endpoint.
pub async fn fetch_relay_info(
    http: &reqwest::Client,
    relay_url: &str,
    timeouts: &RelayTimeouts,
) -> Option<RelayInformation> {
    let url = match info_url(relay_url) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("[relay-link] cannot derive capability URL for {}: {}", relay_url, e);
            return None;
        }
    };

    log::debug!("[relay-link] fetching capability document from {}", url);
    let started = Instant::now();

    let response = match http
        .get(url.clone())
        .header(ACCEPT, NOSTR_JSON)
        .timeout(timeouts.info)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            log::debug!("[relay-link] capability fetch {} failed: {}", url, e);
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        log::debug!("[relay-link] capability fetch {}: HTTP {}", url, status);
        return None;
    }

    match response.json::<RelayInformation>().await {
        Ok(info) => {
            log::debug!(
                "[relay-link] capability document from {} fetched in {:?}",
                url,
                started.elapsed()
            );
            Some(info)
        }
        Err(e) => {
            log::warn!(
                "[relay-link] capability document from {} is not valid: {}",
                url,
                e
            );
            None
        }
    }
}
