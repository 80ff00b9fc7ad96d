//! Descriptive command handlers
//!
//! Backend catalogue and configuration snapshot.

use anyhow::Result;
use colored::*;
use harvest_client::HarvestClient;

use crate::config::Config;

/// List supported backends
pub async fn list_backends(config: &Config) -> Result<()> {
    let client = HarvestClient::new(&config.server_url);
    let list = client.list_backends().await?;

    println!("{}", format!("{} backend(s):", list.backends.len()).bold());
    println!();
    for backend in list.backends {
        let modes: Vec<&str> = backend.modes.iter().map(|m| m.as_str()).collect();
        println!(
            "  {} {:<6} {}",
            "▸".cyan(),
            backend.code.to_string().bold(),
            backend.name
        );
        println!("    Modes: {}", modes.join(", ").dimmed());
    }

    Ok(())
}

/// Show the orchestrator configuration
pub async fn show_config(config: &Config) -> Result<()> {
    let client = HarvestClient::new(&config.server_url);
    let snapshot = client.get_config().await?;

    println!("{}", "Orchestrator Configuration:".bold());
    println!("  Server:            {}", client.base_url().cyan());
    println!("  Job timeout:       {}s", snapshot.job_timeout_secs);
    println!("  Retained jobs:     {}", snapshot.max_retained_jobs);
    println!("  Default save:      {}", snapshot.default_save_option);

    let backends: Vec<String> = snapshot
        .configured_backends
        .iter()
        .map(ToString::to_string)
        .collect();
    if backends.is_empty() {
        println!("  Collectors:        {}", "none configured".yellow());
    } else {
        println!("  Collectors:        {}", backends.join(", "));
    }

    match &snapshot.last_job {
        Some(last) => {
            println!("\n{}", "Last job:".bold());
            println!("{}", serde_json::to_string_pretty(last)?);
        }
        None => println!("\n{}", "No job has run yet.".dimmed()),
    }

    Ok(())
}
