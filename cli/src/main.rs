//! relay-cli - terminal client for the relay-link engine
//!
//! # Usage
//!
//! ```bash
//! # Sweep the built-in relay registry
//! relay-cli probe
//!
//! # Probe specific relays
//! relay-cli probe wss://relay.damus.io nos.lol
//!
//! # Capability document
//! relay-cli info wss://nostr.wine
//!
//! # Last 20 text notes
//! relay-cli query wss://relay.damus.io -k 1 -l 20
//!
//! # Live stream until Ctrl-C
//! relay-cli stream wss://relay.damus.io -k 1
//! ```

use anyhow::Result;
use clap::Parser;
use relay_link::RelayTimeouts;
use std::time::Duration;

mod args;
mod commands;
mod output;

use args::{Cli, Commands, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        cli.format
    };

    let timeouts = match cli.timeout_ms {
        Some(ms) => {
            let ceiling = Duration::from_millis(ms);
            RelayTimeouts::builder()
                .probe_timeout(ceiling)
                .connect_timeout(ceiling)
                .info_timeout(ceiling)
                .query_timeout(ceiling)
                .build()
        }
        None => RelayTimeouts::default(),
    };

    match cli.command {
        Commands::Probe { urls, registry } => {
            commands::probe::run(urls, registry, timeouts, format).await
        }
        Commands::Info { url } => commands::info::run(&url, timeouts, format).await,
        Commands::Query {
            url,
            kinds,
            limit,
            since,
        } => commands::query::run(&url, kinds, limit, since, timeouts, format).await,
        Commands::Stream { url, kinds, max } => {
            commands::stream::run(&url, kinds, max, timeouts).await
        }
    }
}
