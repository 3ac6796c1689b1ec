//! axumサーバー起動・シャットダウンハンドリング

use crate::health::InstanceHealthMonitor;
use crate::registry::ServiceRegistry;
use crate::{api, AppState};
use client_platform_common::{
    config::GatewayConfig,
    error::{GatewayError, GatewayResult},
    shutdown::{shutdown_signal, ShutdownController},
};
use tokio::net::TcpListener;
use tracing::info;

/// バインド済みのリスナーでゲートウェイを起動し、シャットダウンまで待機する
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: ShutdownController,
) -> GatewayResult<()> {
    let app = api::create_app(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| GatewayError::Internal(format!("Server error: {}", e)))
}

/// レジストリ・ヘルスモニターを用意してゲートウェイを実行する
pub async fn run(config: GatewayConfig, shutdown: ShutdownController) -> GatewayResult<()> {
    let registry = ServiceRegistry::new();
    let state = AppState::new(registry.clone(), &config)?;

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .map_err(|e| GatewayError::Internal(format!("Failed to bind {}: {}", config.bind_addr(), e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    info!("API gateway listening on {}", local_addr);

    let monitor = InstanceHealthMonitor::from_config(registry, &config)
        .with_balancer(state.balancer.clone())
        .start(shutdown.clone());

    let result = serve(listener, state, shutdown.clone()).await;

    shutdown.request_shutdown();
    let _ = monitor.await;

    info!("Server shutdown complete");
    result
}
