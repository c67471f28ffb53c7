use crate::args::OutputFormat;
use crate::output;
use anyhow::Result;
use relay_link::{RelayClient, RelayTimeouts};

pub async fn run(url: &str, timeouts: RelayTimeouts, format: OutputFormat) -> Result<()> {
    let client = RelayClient::builder().timeouts(timeouts).build()?;
    match client.fetch_info(url).await? {
        Some(info) => match format {
            OutputFormat::Json => output::print_info_json(&info)?,
            OutputFormat::Table => output::print_info_table(url, &info),
        },
        None => println!("{} serves no capability document", url),
    }
    Ok(())
}
