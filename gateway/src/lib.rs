//! API Gateway
//!
//! ディスカバリレジストリから都度導出したルートに従って、
//! サービス名プレフィックス付きのリクエストを正常インスタンスへ転送する。

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// インスタンス選択（ラウンドロビン）
pub mod balancer;

/// CLIインターフェース
pub mod cli;

/// インスタンスヘルスモニター
pub mod health;

/// ディスカバリレジストリ
pub mod registry;

/// ルート導出
pub mod routes;

/// axumサーバー起動
pub mod server;

use client_platform_common::{
    config::{DiscoveryLocatorProperties, GatewayConfig},
    error::{GatewayError, GatewayResult},
};
use std::time::Duration;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// サービスインスタンスレジストリ
    pub registry: registry::ServiceRegistry,
    /// 転送先選択
    pub balancer: balancer::RoundRobinBalancer,
    /// 転送用HTTPクライアント
    pub http_client: reqwest::Client,
    /// ルート導出設定
    pub discovery: DiscoveryLocatorProperties,
}

impl AppState {
    /// 設定から状態を組み立てる
    pub fn new(registry: registry::ServiceRegistry, config: &GatewayConfig) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            registry,
            balancer: balancer::RoundRobinBalancer::new(),
            http_client,
            discovery: config.discovery.clone(),
        })
    }
}
