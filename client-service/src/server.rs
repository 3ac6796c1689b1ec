//! axumサーバー起動・シャットダウンハンドリング

use crate::discovery::DiscoveryClient;
use crate::{api, db, AppState};
use client_platform_common::{
    config::ClientServiceConfig,
    error::{ClientServiceError, ServiceResult},
    protocol::RegisterInstanceRequest,
    shutdown::{shutdown_signal, ShutdownController},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// バインド済みのリスナーでサーバーを起動し、シャットダウンまで待機する
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: ShutdownController,
) -> ServiceResult<()> {
    let app = api::create_app(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| ClientServiceError::Internal(format!("Server error: {}", e)))
}

/// ストア初期化・リスナー確保・自己登録を行い、サーバーを実行する
pub async fn run(config: ClientServiceConfig, shutdown: ShutdownController) -> ServiceResult<()> {
    let pool = db::create_pool(&config.database_url).await?;
    let state = AppState::from_pool(pool.clone());

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .map_err(|e| ClientServiceError::Internal(format!("Failed to bind {}: {}", config.bind_addr(), e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| ClientServiceError::Internal(e.to_string()))?;

    info!("Client service listening on {}", local_addr);

    let discovery = match &config.gateway_url {
        Some(url) => {
            let registration = registration_request(&config, local_addr);
            let client = DiscoveryClient::new(url.clone(), registration)?;
            info!(registry = %url, "Discovery registration enabled");
            Some(client.start(
                Duration::from_secs(config.heartbeat_interval_secs),
                shutdown.clone(),
            ))
        }
        None => {
            info!("No gateway_url configured, skipping discovery registration");
            None
        }
    };

    let result = serve(listener, state, shutdown.clone()).await;

    // サーバー側のエラー終了でも登録解除まで進める
    shutdown.request_shutdown();
    if let Some(handle) = discovery {
        let _ = handle.await;
    }
    pool.close().await;

    info!("Server shutdown complete");
    result
}

/// レジストリへ広告するホスト・ポートを決める
///
/// ワイルドカードでバインドしている場合はループバックを広告する。
pub fn registration_request(
    config: &ClientServiceConfig,
    local_addr: SocketAddr,
) -> RegisterInstanceRequest {
    let host = config.advertised_host.clone().unwrap_or_else(|| {
        match config.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "127.0.0.1".to_string(),
            other => other.to_string(),
        }
    });

    RegisterInstanceRequest {
        service_name: config.service_name.clone(),
        host,
        port: local_addr.port(),
        metadata: HashMap::new(),
    }
}
