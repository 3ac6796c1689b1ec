//! API Gateway Entry Point

use anyhow::Context;
use api_gateway::{cli::Cli, server};
use clap::Parser;
use client_platform_common::{config::GatewayConfig, logging, shutdown::ShutdownController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        GatewayConfig::load(cli.config.as_deref()).context("failed to load gateway configuration")?;
    cli.apply(&mut config);
    config.validate().context("invalid gateway configuration")?;

    let _guard = logging::init("api-gateway", &config.log_level, config.log_dir.as_deref())
        .context("failed to initialize logging")?;

    tracing::info!(
        lower_case_service_id = config.discovery.lower_case_service_id,
        route_id_prefix = %config.discovery.route_id_prefix,
        "Starting api-gateway"
    );

    server::run(config, ShutdownController::default())
        .await
        .context("api-gateway terminated with an error")?;
    Ok(())
}
