//! Store command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use harvest_client::HarvestClient;
use harvest_core::dto::store::StoreKind;

use crate::config::Config;

/// Store subcommands
#[derive(Subcommand)]
pub enum StoreCommands {
    /// Create the result tables of a store engine
    Init {
        /// Store engine (sqlite or mysql)
        #[arg(value_parser = parse_kind)]
        kind: StoreKind,
    },
}

fn parse_kind(value: &str) -> Result<StoreKind, String> {
    StoreKind::parse(value).ok_or_else(|| format!("expected sqlite or mysql, got '{}'", value))
}

/// Handle store commands
pub async fn handle_store_command(command: StoreCommands, config: &Config) -> Result<()> {
    let client = HarvestClient::new(&config.server_url);

    match command {
        StoreCommands::Init { kind } => {
            let response = client.init_store(kind).await?;
            println!("{} {}", "✓".green(), response.message);
            println!(
                "  {}",
                response
                    .timestamp
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .dimmed()
            );
            Ok(())
        }
    }
}
