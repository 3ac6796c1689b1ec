//! ヘルスチェックAPIハンドラー

use crate::{db, AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

/// GET /health - ストア疎通を含むヘルスチェック
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match db::ping(&state.db_pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "UP",
                "components": { "db": "UP" }
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "DOWN",
                    "components": { "db": "DOWN" }
                })),
            )
        }
    }
}
