use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// relay-cli - terminal client for exploring Nostr relays
#[derive(Parser, Debug)]
#[command(name = "relay-cli")]
#[command(version)]
#[command(about = "Probe, inspect, and subscribe to Nostr relays", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long = "format", value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Enable JSON output (shorthand for --format=json)
    #[arg(long = "json", conflicts_with = "format", global = true)]
    pub json: bool,

    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the per-operation ceiling, in milliseconds
    #[arg(long = "timeout-ms", global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe relays and print a consolidated health snapshot
    Probe {
        /// Relay URLs to probe instead of the built-in registry
        urls: Vec<String>,

        /// Load the registry from a JSON file
        #[arg(long = "registry", conflicts_with = "urls")]
        registry: Option<PathBuf>,
    },

    /// Fetch a relay's NIP-11 capability document
    Info {
        /// Relay URL
        url: String,
    },

    /// Run a bounded query and print the collected events
    Query {
        /// Relay URL
        url: String,

        /// Event kinds to match (repeatable)
        #[arg(short = 'k', long = "kind")]
        kinds: Vec<u32>,

        /// Maximum number of events to collect
        #[arg(short = 'l', long = "limit", default_value_t = 10)]
        limit: u32,

        /// Only events created at or after this Unix timestamp
        #[arg(long = "since")]
        since: Option<u64>,
    },

    /// Stream live events until interrupted
    Stream {
        /// Relay URL
        url: String,

        /// Event kinds to match (repeatable)
        #[arg(short = 'k', long = "kind")]
        kinds: Vec<u32>,

        /// Stop after this many events
        #[arg(short = 'n', long = "max")]
        max: Option<usize>,
    },
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned plain-text table
    Table,
    /// Pretty-printed JSON
    Json,
}
