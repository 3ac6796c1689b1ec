//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    response::IntoResponse,
    Json,
};
use client_platform_common::error::{ClientServiceError, CommonError};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub ClientServiceError);

impl From<ClientServiceError> for AppError {
    fn from(err: ClientServiceError) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(ClientServiceError::Common(CommonError::from_rejection(
            rejection.status(),
            rejection.body_text(),
        )))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(ClientServiceError::Common(CommonError::from_rejection(
            rejection.status(),
            rejection.body_text(),
        )))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        // 詳細はログのみに残し、レスポンスには外部向けメッセージだけを載せる
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.0.to_error_response())).into_response()
    }
}
