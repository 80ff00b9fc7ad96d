//! Harvest Orchestrator
//!
//! HTTP service that admits collection jobs, runs them one at a time through
//! per-backend collector workers and keeps their status in memory.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::collector::HttpCollectorFactory;
use crate::config::Config;
use crate::repository::JobRegistry;
use crate::service::JobOrchestrator;
use crate::store::SqlStore;

pub mod api;
pub mod collector;
pub mod config;
pub mod repository;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harvest_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Harvest Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        "Loaded configuration: job_timeout={:?}, max_retained_jobs={}, default_save_option={}",
        config.job_timeout, config.max_retained_jobs, config.default_save_option
    );

    let store = Arc::new(SqlStore::new(
        config.sqlite_url.clone(),
        config.mysql_url.clone(),
    ));

    let collectors = Arc::new(
        HttpCollectorFactory::new(
            config.collector_urls.clone(),
            config.collector_connect_timeout,
        )
        .context("Failed to build collector client")?,
    );
    if config.collector_urls.is_empty() {
        tracing::warn!("No collector endpoints configured; every job will fail");
    }
    for (backend, url) in &config.collector_urls {
        info!("  - {} -> {}", backend, url);
    }

    let registry = Arc::new(JobRegistry::new(config.max_retained_jobs));
    let orchestrator = JobOrchestrator::new(
        registry,
        collectors,
        store.clone(),
        config.orchestrator_settings(),
    );

    // Build router with all API endpoints
    let app = api::create_router(api::AppState {
        orchestrator: orchestrator.clone(),
        store,
    });

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    orchestrator.shutdown().await;
    info!("Harvest Orchestrator stopped");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received, stopping server");
}
