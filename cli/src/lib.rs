//! Command-line surface for vehicle recall and complaint lookups.

pub mod config;
pub mod fetcher;
pub mod geo_cmd;
pub mod lookup_cmd;
pub mod search_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "recallscope", version, about = "Vehicle recall and complaint lookups")]
pub struct Cli {
    /// Config file (defaults to ./recallscope.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Offline per-state complaint index
    Geo(geo_cmd::GeoCli),

    /// Fetch (or reuse cached) recalls and complaints for a vehicle
    Lookup(lookup_cmd::LookupArgs),

    /// Rank a vehicle's flattened complaints against a symptom query
    Search(search_cmd::SearchArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?;
        match self.command {
            Command::Geo(cli) => cli.run(&config),
            Command::Lookup(args) => lookup_cmd::run(args, &config),
            Command::Search(args) => search_cmd::run(args, &config),
        }
    }
}

/// Install the stderr subscriber; `log` records from the library crates
/// are forwarded into it.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {err}");
    }
}
