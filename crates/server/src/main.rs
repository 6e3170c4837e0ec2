//! swkit-relay entry point.
//!
//! Serves the token registration and notification send endpoints over
//! HTTP. Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::Result;
use swkit_client::{DocumentStoreClient, DocumentStoreConfig, PushClient, PushConfig};
use swkit_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let relay = &config.relay;

    let tokens = DocumentStoreClient::new(DocumentStoreConfig {
        base_url: relay.document_store_url.clone(),
        document_id: relay.require_document_id()?.to_string(),
        api_key: relay.require_document_store_key()?.to_string(),
        timeout: relay.timeout(),
        user_agent: config.user_agent.clone(),
    })?;
    let push = PushClient::new(PushConfig {
        endpoint: relay.push_endpoint.clone(),
        server_key: relay.require_push_server_key()?.to_string(),
        timeout: relay.timeout(),
    })?;

    let state = Arc::new(handler::RelayState {
        tokens: Arc::new(tokens),
        push: Arc::new(push),
        notifications: config.notifications.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&relay.bind_addr).await?;
    tracing::info!(addr = %relay.bind_addr, "Starting swkit-relay");

    axum::serve(listener, handler::router(state)).await?;

    Ok(())
}
