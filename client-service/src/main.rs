//! Client Record Store Server Entry Point

use anyhow::Context;
use clap::Parser;
use client_platform_common::{config::ClientServiceConfig, logging, shutdown::ShutdownController};
use client_service::{cli::Cli, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientServiceConfig::load(cli.config.as_deref())
        .context("failed to load client-service configuration")?;
    cli.apply(&mut config);
    config.validate().context("invalid client-service configuration")?;

    let _guard = logging::init("client-service", &config.log_level, config.log_dir.as_deref())
        .context("failed to initialize logging")?;

    tracing::info!(
        database_url = %config.database_url,
        gateway_url = ?config.gateway_url,
        "Starting client-service"
    );

    server::run(config, ShutdownController::default())
        .await
        .context("client-service terminated with an error")?;
    Ok(())
}
