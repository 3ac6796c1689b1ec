//! REST APIハンドラー
//!
//! レジストリAPI、ヘルスチェック、それ以外はすべて転送

/// エラーレスポンス
pub mod error;
/// ヘルスチェック
pub mod health;
/// リクエスト転送
pub mod proxy;
/// レジストリAPI
pub mod registry;

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/registry/instances", post(registry::register_instance))
        .route(
            "/registry/instances/:id/heartbeat",
            put(registry::heartbeat),
        )
        .route("/registry/instances/:id", delete(registry::deregister_instance))
        .route("/registry/services", get(registry::list_services))
        .route("/registry/routes", get(registry::list_routes))
        .route("/health", get(health::health_check))
        .fallback(proxy::forward)
        .layer(DefaultBodyLimit::max(proxy::MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
