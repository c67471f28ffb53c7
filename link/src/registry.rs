//! The endpoint registry: the population of relays a sweep targets.
//!
//! Carries a curated default relay list, accepts a JSON registry
//! document, and takes ad-hoc additions from bare user input.  The
//! registry owns endpoint descriptors only — never connections.

use crate::connection::normalize_relay_url;
use crate::error::Result;
use crate::models::{Endpoint, PricingClass};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// One entry of a JSON registry document.
#[derive(Debug, Clone, Deserialize)]
struct RegistryEntry {
    url: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    pricing: PricingClass,
}

/// An ordered set of relay endpoints.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Arc<Endpoint>>,
}

impl EndpointRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in list of well-known public relays.
    pub fn default_relays() -> Self {
        let defaults: &[(&str, &str, &str, &str, &[&str], PricingClass)] = &[
            (
                "wss://relay.damus.io",
                "Damus",
                "Large general-purpose relay operated by the Damus team.",
                "us-west",
                &["general"],
                PricingClass::Free,
            ),
            (
                "wss://nos.lol",
                "nos.lol",
                "Community relay with generous limits.",
                "us-east",
                &["general", "community"],
                PricingClass::Free,
            ),
            (
                "wss://relay.nostr.band",
                "Nostr.Band",
                "Indexing relay backing the nostr.band search engine.",
                "europe",
                &["search", "indexing"],
                PricingClass::Free,
            ),
            (
                "wss://nostr.wine",
                "Nostr.Wine",
                "Curated paid relay with spam filtering.",
                "us-east",
                &["general", "curated"],
                PricingClass::Paid,
            ),
            (
                "wss://relay.snort.social",
                "Snort",
                "Default relay of the Snort web client.",
                "europe",
                &["general"],
                PricingClass::Free,
            ),
            (
                "wss://offchain.pub",
                "Offchain",
                "General-purpose relay for long-form and notes.",
                "us-east",
                &["general", "longform"],
                PricingClass::Free,
            ),
            (
                "wss://relay.primal.net",
                "Primal",
                "Caching relay operated by Primal.",
                "us-east",
                &["general", "caching"],
                PricingClass::Free,
            ),
            (
                "wss://eden.nostr.land",
                "Eden",
                "Paid relay with long retention.",
                "us-east",
                &["general", "archive"],
                PricingClass::Paid,
            ),
        ];

        let endpoints = defaults
            .iter()
            .map(|(url, name, description, region, topics, pricing)| {
                Arc::new(
                    Endpoint::new(derive_id(url), *url, *name)
                        .with_description(*description)
                        .with_region(*region)
                        .with_topics(topics.iter().map(|t| t.to_string()))
                        .with_pricing(*pricing),
                )
            })
            .collect();

        Self { endpoints }
    }

    /// Build a registry from a JSON document: an array of entries with a
    /// required `url` and optional `id`, `name`, `description`, `region`,
    /// `topics`, and `pricing` keys.
    pub fn from_json(document: &str) -> Result<Self> {
        let entries: Vec<RegistryEntry> = serde_json::from_str(document)?;
        let mut registry = Self::new();
        for entry in entries {
            registry.add_entry(entry)?;
        }
        Ok(registry)
    }

    /// Add an endpoint from ad-hoc user input (a URL or bare host).
    ///
    /// Input is normalized and validated; adding a URL that is already
    /// registered returns the existing endpoint.
    pub fn add_url(&mut self, input: &str) -> Result<Arc<Endpoint>> {
        self.add_entry(RegistryEntry {
            url: input.to_string(),
            id: None,
            name: None,
            description: String::new(),
            region: String::new(),
            topics: Vec::new(),
            pricing: PricingClass::Free,
        })
    }

    fn add_entry(&mut self, entry: RegistryEntry) -> Result<Arc<Endpoint>> {
        let url = normalize_relay_url(&entry.url)?;
        if let Some(existing) = self.endpoints.iter().find(|ep| ep.url == url) {
            return Ok(Arc::clone(existing));
        }
        let id = entry.id.unwrap_or_else(|| derive_id(&url));
        let name = entry.name.unwrap_or_else(|| id.clone());
        let endpoint = Arc::new(
            Endpoint::new(id, url, name)
                .with_description(entry.description)
                .with_region(entry.region)
                .with_topics(entry.topics)
                .with_pricing(entry.pricing),
        );
        self.endpoints.push(Arc::clone(&endpoint));
        Ok(endpoint)
    }

    /// All registered endpoints, in insertion order.
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    /// Look an endpoint up by its stable id.
    pub fn get(&self, id: &str) -> Option<Arc<Endpoint>> {
        self.endpoints.iter().find(|ep| ep.id == id).cloned()
    }

    /// Look an endpoint up by its (normalized) URL.
    pub fn find_by_url(&self, url: &str) -> Option<Arc<Endpoint>> {
        self.endpoints.iter().find(|ep| ep.url == url).cloned()
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Derive a stable endpoint id from a normalized relay URL (host plus
/// port, when one is present).
fn derive_id(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("unknown");
            match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            }
        }
        Err(_) => url.to_string(),
    }
}
