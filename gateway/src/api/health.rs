//! ヘルスチェックAPIハンドラー

use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// GET /health - ゲートウェイ自身の稼働確認
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let instances = state.registry.list().await;
    let healthy = instances.iter().filter(|i| i.is_healthy()).count();

    Json(json!({
        "status": "UP",
        "instances": {
            "total": instances.len(),
            "up": healthy,
        }
    }))
}
