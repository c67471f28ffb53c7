//! Result formatting: aligned tables for humans, JSON for scripts.

use anyhow::Result;
use relay_link::{
    EndpointRegistry, EndpointStatus, EventPayload, HealthSnapshot, RelayInformation,
};
use serde_json::json;

/// Longest content preview shown in table mode.
const CONTENT_PREVIEW_CHARS: usize = 60;

pub fn print_probe_table(registry: &EndpointRegistry, snapshot: &HealthSnapshot) {
    println!(
        "{:<16} {:<36} {:<9} {:>9}  NIPS",
        "NAME", "URL", "STATUS", "LATENCY"
    );
    for endpoint in registry.endpoints() {
        let state = endpoint.observed();
        let status = match state.status {
            EndpointStatus::Online => "online",
            EndpointStatus::Offline => "offline",
            EndpointStatus::Checking => "checking",
        };
        let latency = state
            .latency_ms
            .map(|ms| format!("{} ms", ms))
            .unwrap_or_else(|| "-".to_string());
        let nips = if state.supported_nips.is_empty() {
            "-".to_string()
        } else {
            state
                .supported_nips
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        println!(
            "{:<16} {:<36} {:<9} {:>9}  {}",
            truncate(&endpoint.name, 16),
            truncate(&endpoint.url, 36),
            status,
            latency,
            nips
        );
    }

    println!();
    let average = snapshot
        .average_latency_ms
        .map(|ms| format!("{} ms", ms))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "online {}/{}  offline {}  average latency {}",
        snapshot.online, snapshot.total, snapshot.offline, average
    );
    if !snapshot.nip_support.is_empty() {
        let support = snapshot
            .nip_support
            .iter()
            .map(|(nip, s)| format!("{} ({:.0}%)", nip, s.fraction * 100.0))
            .collect::<Vec<_>>()
            .join("  ");
        println!("nip support: {}", support);
    }
}

pub fn print_probe_json(registry: &EndpointRegistry, snapshot: &HealthSnapshot) -> Result<()> {
    let endpoints: Vec<_> = registry
        .endpoints()
        .iter()
        .map(|endpoint| {
            json!({
                "id": endpoint.id,
                "url": endpoint.url,
                "name": endpoint.name,
                "region": endpoint.region,
                "topics": endpoint.topics,
                "pricing": endpoint.pricing,
                "state": endpoint.observed(),
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "endpoints": endpoints,
            "snapshot": snapshot,
        }))?
    );
    Ok(())
}

pub fn print_info_table(url: &str, info: &RelayInformation) {
    println!("relay: {}", url);
    if let Some(name) = &info.name {
        println!("name: {}", name);
    }
    if let Some(description) = &info.description {
        println!("description: {}", description);
    }
    if let Some(software) = &info.software {
        let version = info.version.as_deref().unwrap_or("");
        println!("software: {} {}", software, version);
    }
    if let Some(contact) = &info.contact {
        println!("contact: {}", contact);
    }
    if !info.supported_nips.is_empty() {
        let nips = info
            .supported_nips
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("supported nips: {}", nips);
    }
    if let Some(limitation) = &info.limitation {
        if let Some(max) = limitation.max_subscriptions {
            println!("max subscriptions: {}", max);
        }
        if let Some(max) = limitation.max_limit {
            println!("max limit: {}", max);
        }
        if limitation.auth_required == Some(true) {
            println!("auth required: yes");
        }
        if limitation.payment_required == Some(true) {
            println!("payment required: yes");
        }
    }
}

pub fn print_info_json(info: &RelayInformation) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(info)?);
    Ok(())
}

pub fn print_events_table(events: &[EventPayload]) {
    if events.is_empty() {
        println!("no events");
        return;
    }
    println!("{:<12} {:<6} {:<10}  CONTENT", "CREATED", "KIND", "AUTHOR");
    for event in events {
        println!(
            "{:<12} {:<6} {:<10}  {}",
            event.created_at,
            event.kind,
            truncate(&event.pubkey, 10),
            preview(&event.content)
        );
    }
    println!();
    println!("{} event(s)", events.len());
}

pub fn print_events_json(events: &[EventPayload]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(events)?);
    Ok(())
}

pub fn print_event_line(event: &EventPayload) {
    println!(
        "[{}] kind {} {}: {}",
        event.created_at,
        event.kind,
        truncate(&event.pubkey, 10),
        preview(&event.content)
    );
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

fn preview(content: &str) -> String {
    truncate(&content.replace('\n', " "), CONTENT_PREVIEW_CHARS)
}
