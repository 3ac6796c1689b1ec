//! クライアントAPIハンドラー

use super::error::AppError;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use client_platform_common::types::{Client, NewClient};

/// GET /api/client - クライアント一覧
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, AppError> {
    let clients = state.clients.list_clients().await?;
    Ok(Json(clients))
}

/// GET /api/client/:id - クライアント取得
pub async fn get_client(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Client>, AppError> {
    let Path(id) = id?;
    let client = state.clients.get_client(id).await?;
    Ok(Json(client))
}

/// POST /api/client - クライアント作成
pub async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    // 抽出失敗もJSONエラーボディで返す
    let Json(candidate) = payload?;
    let client = state.clients.create_client(candidate).await?;
    Ok((StatusCode::CREATED, Json(client)))
}
