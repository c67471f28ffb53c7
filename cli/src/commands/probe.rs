use crate::args::OutputFormat;
use crate::output;
use anyhow::{Context, Result};
use relay_link::{EndpointRegistry, RelayClient, RelayTimeouts};
use std::path::PathBuf;

pub async fn run(
    urls: Vec<String>,
    registry_path: Option<PathBuf>,
    timeouts: RelayTimeouts,
    format: OutputFormat,
) -> Result<()> {
    let registry = if let Some(path) = registry_path {
        let document = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        EndpointRegistry::from_json(&document)
            .with_context(|| format!("invalid registry document {}", path.display()))?
    } else if urls.is_empty() {
        EndpointRegistry::default_relays()
    } else {
        let mut registry = EndpointRegistry::new();
        for url in &urls {
            registry
                .add_url(url)
                .with_context(|| format!("invalid relay URL '{}'", url))?;
        }
        registry
    };

    log::info!("probing {} relay(s)", registry.len());
    let client = RelayClient::builder()
        .registry(registry)
        .timeouts(timeouts)
        .build()?;
    let snapshot = client.probe_all().await;

    match format {
        OutputFormat::Json => output::print_probe_json(client.registry(), &snapshot)?,
        OutputFormat::Table => output::print_probe_table(client.registry(), &snapshot),
    }
    Ok(())
}
