//! # homegraphd — homegraph daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize `tracing` with the configured filter
//! - Load the registry dump and publish it into the snapshot feed
//! - Periodically reload the dump when configured to
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use homegraph_adapter_http_axum::state::AppState;
use homegraph_adapter_registry_json::{Config as RegistryConfig, JsonRegistryLoader};
use homegraph_app::services::registry_sync::RegistrySync;
use homegraph_app::services::target_service::TargetService;
use homegraph_app::snapshot_feed::SnapshotFeed;
use homegraph_domain::filter::SecondaryEntities;
use homegraph_domain::search::SearchOptions;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Registry
    let feed = Arc::new(SnapshotFeed::default());
    let loader = RegistryConfig {
        path: config.registry.path.clone(),
        strict: config.registry.strict,
    }
    .build();
    let registry_sync = Arc::new(RegistrySync::new(loader, Arc::clone(&feed)));

    match registry_sync.reload().await {
        Ok(stats) => tracing::info!(?stats, "initial registry loaded"),
        Err(err) => tracing::warn!(
            error = %err,
            path = %config.registry.path.display(),
            "initial registry load failed, serving an empty registry"
        ),
    }

    if let Some(period) = config.reload_interval() {
        tokio::spawn(reload_periodically(Arc::clone(&registry_sync), period));
    }

    // Services
    let secondary = if config.registry.include_secondary {
        SecondaryEntities::Include
    } else {
        SecondaryEntities::Exclude
    };
    let target_service = TargetService::new(Arc::clone(&feed))
        .with_secondary(secondary)
        .with_search_options(SearchOptions {
            min_term_length: config.search.min_term_length,
            ..SearchOptions::default()
        });

    // HTTP
    let state = AppState::from_arcs(Arc::new(target_service), registry_sync);
    let app = homegraph_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("homegraphd listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("homegraphd stopped");
    Ok(())
}

async fn reload_periodically(sync: Arc<RegistrySync<JsonRegistryLoader>>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // the first tick completes immediately and the initial load already ran
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(err) = sync.reload().await {
            tracing::warn!(error = %err, "registry reload failed, keeping previous snapshot");
        }
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
