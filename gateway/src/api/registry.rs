//! レジストリAPIハンドラー

use super::error::AppError;
use crate::registry::RegistrySnapshot;
use crate::routes::{routes_from_snapshot, RouteTable};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use client_platform_common::protocol::{RegisterInstanceRequest, RegisterInstanceResponse};
use uuid::Uuid;

/// POST /registry/instances - インスタンス登録
pub async fn register_instance(
    State(state): State<AppState>,
    payload: Result<Json<RegisterInstanceRequest>, JsonRejection>,
) -> Result<Json<RegisterInstanceResponse>, AppError> {
    let Json(req) = payload?;
    let response = state.registry.register(req).await?;
    Ok(Json(response))
}

/// PUT /registry/instances/:id/heartbeat - ハートビート
pub async fn heartbeat(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.registry.heartbeat(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /registry/instances/:id - 登録解除
pub async fn deregister_instance(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.registry.deregister(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /registry/services - サービス名ごとのインスタンス一覧
pub async fn list_services(State(state): State<AppState>) -> Json<RegistrySnapshot> {
    Json(state.registry.snapshot().await)
}

/// GET /registry/routes - 現在導出されるルート定義
pub async fn list_routes(State(state): State<AppState>) -> Json<RouteTable> {
    let snapshot = state.registry.snapshot().await;
    Json(routes_from_snapshot(&snapshot, &state.discovery))
}
