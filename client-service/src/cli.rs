//! CLI module for client-service
//!
//! 設定ファイル・環境変数より優先される起動オプション

use clap::Parser;
use client_platform_common::config::ClientServiceConfig;
use std::path::PathBuf;

/// Client Record Store server
#[derive(Parser, Debug)]
#[command(name = "client-service")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    CLIENT_SERVICE__HOST                    Bind address (default: 0.0.0.0)
    CLIENT_SERVICE__PORT                    Listen port (default: 8081)
    CLIENT_SERVICE__DATABASE_URL            Database URL (default: sqlite://clients.db)
    CLIENT_SERVICE__SERVICE_NAME            Name registered with discovery (default: client-service)
    CLIENT_SERVICE__GATEWAY_URL             Discovery registry base URL (registration disabled if unset)
    CLIENT_SERVICE__ADVERTISED_HOST         Host advertised to the registry
    CLIENT_SERVICE__HEARTBEAT_INTERVAL_SECS Heartbeat interval (default: 10)
    CLIENT_SERVICE__LOG_LEVEL               Log level (default: info)
    CLIENT_SERVICE__LOG_DIR                 Directory for daily log files
"#)]
pub struct Cli {
    /// Configuration file (TOML/YAML/JSON)
    #[arg(short, long, env = "CLIENT_SERVICE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Database URL
    #[arg(long)]
    pub database_url: Option<String>,

    /// Discovery registry base URL
    #[arg(long)]
    pub gateway_url: Option<String>,
}

impl Cli {
    /// 指定されたオプションだけを設定に上書きする
    pub fn apply(&self, config: &mut ClientServiceConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(url) = &self.gateway_url {
            config.gateway_url = Some(url.clone());
        }
    }
}
