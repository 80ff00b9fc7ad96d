//! Harvest CLI
//!
//! Command-line interface for interacting with the Harvest orchestrator.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Harvest collection job CLI", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(long, env = "HARVEST_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
