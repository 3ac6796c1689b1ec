//! CLI module for api-gateway

use clap::Parser;
use client_platform_common::config::GatewayConfig;
use std::path::PathBuf;

/// Discovery-routed API gateway
#[derive(Parser, Debug)]
#[command(name = "api-gateway")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    GATEWAY__HOST                           Bind address (default: 0.0.0.0)
    GATEWAY__PORT                           Listen port (default: 8888)
    GATEWAY__HEALTH_CHECK_INTERVAL_SECS     Registry sweep interval (default: 30)
    GATEWAY__INSTANCE_TIMEOUT_SECS          Heartbeat age before DOWN (default: 90)
    GATEWAY__EVICTION_TIMEOUT_SECS          Heartbeat age before eviction (default: 300)
    GATEWAY__CONNECT_TIMEOUT_SECS           Upstream connect timeout (default: 5)
    GATEWAY__REQUEST_TIMEOUT_SECS           Upstream request timeout (default: 30)
    GATEWAY__DISCOVERY__LOWER_CASE_SERVICE_ID  Lower-case route prefixes (default: true)
    GATEWAY__DISCOVERY__ROUTE_ID_PREFIX     Route id prefix (default: discovery_)
    GATEWAY__LOG_LEVEL                      Log level (default: info)
    GATEWAY__LOG_DIR                        Directory for daily log files
"#)]
pub struct Cli {
    /// Configuration file (TOML/YAML/JSON)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// 指定されたオプションだけを設定に上書きする
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}
