//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod info;
mod job;
mod store;

pub use job::JobCommands;
pub use store::StoreCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// List supported backends
    Backends,
    /// Result store management
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
    /// Show the orchestrator configuration
    Config,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Backends => info::list_backends(config).await,
        Commands::Store { command } => store::handle_store_command(command, config).await,
        Commands::Config => info::show_config(config).await,
    }
}

/// Parse a string the same way the orchestrator's JSON decoder would
///
/// Keeps CLI spellings (codes and aliases) identical to the HTTP API.
pub(crate) fn parse_wire<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|_| format!("unrecognized value '{}'", value))
}
