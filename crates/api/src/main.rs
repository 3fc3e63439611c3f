//! Medical Expert System - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("failed to load server configuration")?;
    init_logging(&config.log_level)?;

    info!("=== Medical Expert System v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting diagnostic rule service...");

    run_server(config).await?;

    Ok(())
}
