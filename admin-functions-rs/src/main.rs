// admin-functions-rs/src/main.rs
//
// Admin Functions service for the PhotoNotes console
// Serves the privileged callable functions over HTTP

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use admin_functions::{FunctionsService, InMemoryPrincipalStore};
use shared_types::{init_logging, PhotoNotesConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PhotoNotesConfig::load().context("Failed to load configuration")?;

    let service_name = config_rs::get_formatted_service_name(config_rs::ADMIN_FUNCTIONS);
    init_logging(&service_name, &config.logging)?;

    info!("Starting Admin Functions service...");

    let store = Arc::new(InMemoryPrincipalStore::new());
    let service = FunctionsService::new(&config, store);

    let addr = config_rs::get_bind_address(config_rs::ADMIN_FUNCTIONS, config.functions.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Admin Functions listening on {}", addr);
    axum::serve(listener, service.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Admin Functions stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
