//! APIエラーレスポンス型

use axum::{
    extract::rejection::{BytesRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use client_platform_common::error::{CommonError, GatewayError};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub GatewayError);

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError(err)
    }
}

fn rejected(status: StatusCode, detail: String) -> AppError {
    AppError(GatewayError::Common(CommonError::from_rejection(status, detail)))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

// ボディ上限（DefaultBodyLimit）超過は413になる
impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        match &self.0 {
            GatewayError::ServiceUnavailable(service) => {
                tracing::warn!(service = %service, "No available instance");
            }
            err if status.is_server_error() => {
                tracing::error!(error = %err, status = status.as_u16(), "Request failed");
            }
            err => {
                tracing::debug!(error = %err, status = status.as_u16(), "Request rejected");
            }
        }

        (status, Json(self.0.to_error_response())).into_response()
    }
}
