use anyhow::Context;
use clap::Parser;
use parksafe_service::{logging, server, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init(config.log_format)?;

    let state = Arc::new(AppState::from_config(&config)?);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "parksafe-service listening");

    server::serve(listener, state, Duration::from_secs(config.shutdown_grace_secs)).await
}
