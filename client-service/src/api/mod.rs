//! REST APIハンドラー
//!
//! クライアントCRUD、ヘルスチェック

/// クライアントCRUD
pub mod clients;
/// エラーレスポンス
pub mod error;
/// ヘルスチェック
pub mod health;

use crate::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/client",
            get(clients::list_clients).post(clients::create_client),
        )
        .route("/api/client/:id", get(clients::get_client))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
