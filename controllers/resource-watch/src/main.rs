//! Kapp Resource Watch
//!
//! Opens one streaming watch per configured resource kind against the Kapp
//! API and logs every change as it arrives. Broken connections are retried
//! after a fixed delay until the process is interrupted.

mod config;
mod report;

use anyhow::{Context, Result};
use config::Config;
use kapp_client::{Anonymous, BearerToken, KappClient};
use kapp_watch::{HttpTransport, StreamingResourceWatcher};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Kapp resource watch");

    let config = Config::from_env().context("invalid configuration")?;

    info!("Configuration:");
    info!("  Kapp API URL: {}", config.api_url);
    info!("  Kinds: {}", config.kinds.join(", "));
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Retry delay: {:?}", config.watch.retry_delay);
    info!("  Framing: {:?}", config.watch.framing);

    let client = match &config.token {
        Some(token) => KappClient::new(config.api_url.clone(), BearerToken::new(token.clone())),
        None => KappClient::new(config.api_url.clone(), Anonymous),
    }
    .context("failed to create Kapp client")?;
    let client = Arc::new(client);

    info!("Validating Kapp API connectivity...");
    client.validate_connection().await.map_err(|e| {
        error!("Failed to reach Kapp API: {}", e);
        error!("Please ensure:");
        error!("  1. KAPP_API_URL points at the Kapp API ({})", config.api_url);
        error!("  2. KAPP_TOKEN is set and valid if the API requires authentication");
        e
    })?;
    client.catalog().await.context("API resource discovery failed")?;

    let transport = Arc::new(HttpTransport::new(client.http().clone()));
    let watcher = StreamingResourceWatcher::new(client, transport, config.watch.clone());

    let mut handles = Vec::with_capacity(config.kinds.len());
    for kind in &config.kinds {
        let label = kind.clone();
        let handle = watcher
            .watch::<Value, _>(kind, config.namespace.as_deref(), move |event_type, object| {
                report::log_event(&label, event_type, &object);
            })
            .await
            .with_context(|| format!("failed to start {} watch", kind))?;
        handles.push(handle);
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Shutting down {} watches", handles.len());
    for handle in &mut handles {
        handle.stop().await;
    }

    Ok(())
}
