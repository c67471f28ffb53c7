use crate::args::OutputFormat;
use crate::output;
use anyhow::Result;
use relay_link::{Filter, RelayClient, RelayTimeouts};

pub async fn run(
    url: &str,
    kinds: Vec<u32>,
    limit: u32,
    since: Option<u64>,
    timeouts: RelayTimeouts,
    format: OutputFormat,
) -> Result<()> {
    let mut filter = Filter::new().with_limit(limit);
    if !kinds.is_empty() {
        filter = filter.with_kinds(kinds);
    }
    if let Some(since) = since {
        filter = filter.with_since(since);
    }

    let client = RelayClient::builder().timeouts(timeouts).build()?;
    let events = client.query(url, filter).await?;

    match format {
        OutputFormat::Json => output::print_events_json(&events)?,
        OutputFormat::Table => output::print_events_table(&events),
    }
    Ok(())
}
