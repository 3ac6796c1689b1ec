//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! 各エラー型は`external_message()`・`error_type()`・`status_code()`を提供し、
//! 内部詳細（IPアドレス、SQL文など）を含まないHTTPエラーレスポンスを生成できます。

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request body is well-formed JSON but does not match the expected shape
    #[error("Unprocessable request body: {0}")]
    UnprocessableBody(String),

    /// Request body is not declared as JSON
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Request body exceeds the accepted size
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl CommonError {
    /// axumの抽出失敗（Json/Path/Bytes）をステータスに応じて分類する
    ///
    /// `detail` はログ用。レスポンスには `external_message()` だけが載る。
    pub fn from_rejection(status: StatusCode, detail: String) -> Self {
        match status {
            StatusCode::UNPROCESSABLE_ENTITY => Self::UnprocessableBody(detail),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => Self::UnsupportedMediaType(detail),
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge(detail),
            _ => Self::Validation(detail),
        }
    }

    /// Returns a safe error message for external clients.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "Request error",
            Self::Validation(_) => "Invalid request",
            Self::UnprocessableBody(_) => "Invalid request body",
            Self::UnsupportedMediaType(_) => "Expected a JSON request body",
            Self::PayloadTooLarge(_) => "Request body too large",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UnprocessableBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl From<config::ConfigError> for CommonError {
    fn from(err: config::ConfigError) -> Self {
        CommonError::Config(err.to_string())
    }
}

/// Client Record Store error type
#[derive(Debug, Error)]
pub enum ClientServiceError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Client with the given id does not exist
    #[error("Client not found: {0}")]
    NotFound(i64),

    /// Persistence layer unreachable or failing
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Registration with the discovery registry failed
    #[error("Service registration failed: {0}")]
    Registration(String),

    /// Heartbeat to the discovery registry failed
    #[error("Failed to send heartbeat: {0}")]
    Heartbeat(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientServiceError {
    /// Returns a safe error message for external clients.
    ///
    /// Full details (SQL errors, registry addresses) stay in server logs via `Display`.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(err) => err.external_message(),
            Self::NotFound(_) => "Client not found",
            Self::StoreUnavailable(_) => "Store temporarily unavailable",
            Self::Registration(_) => "Service registration failed",
            Self::Heartbeat(_) => "Service heartbeat failed",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Returns the error type string used in error response bodies.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Common(_) => "invalid_request_error",
            Self::NotFound(_) => "not_found_error",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Registration(_) | Self::Heartbeat(_) => "discovery_error",
            Self::Internal(_) => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(err) => err.status_code(),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Registration(_) | Self::Heartbeat(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts this error to an error response body.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.external_message(), self.error_type(), self.status_code())
    }
}

/// API gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// No healthy instance registered for the service
    #[error("No available instance for service: {0}")]
    ServiceUnavailable(String),

    /// Request path does not map to any route
    #[error("No route for path: {0}")]
    RouteNotFound(String),

    /// Registered instance not found
    #[error("Instance not found: {0}")]
    InstanceNotFound(Uuid),

    /// HTTP client error while forwarding
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Upstream timeout
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns a safe error message for external clients.
    ///
    /// Upstream host names and ports are never part of this message.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(err) => err.external_message(),
            Self::ServiceUnavailable(_) => "Service unavailable",
            Self::RouteNotFound(_) => "No route found",
            Self::InstanceNotFound(_) => "Instance not found",
            Self::Http(_) => "Backend service unavailable",
            Self::Timeout(_) => "Request timeout",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Returns the error type string used in error response bodies.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Common(_) => "invalid_request_error",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::RouteNotFound(_) => "not_found_error",
            Self::InstanceNotFound(_) => "not_found_error",
            Self::Http(_) => "service_unavailable",
            Self::Timeout(_) => "server_error",
            Self::Internal(_) => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(err) => err.status_code(),
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::InstanceNotFound(_) => StatusCode::NOT_FOUND,
            Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts this error to an error response body.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.external_message(), self.error_type(), self.status_code())
    }
}

/// エラーレスポンス
///
/// # Example
///
/// ```json
/// {
///   "error": {
///     "message": "Client not found",
///     "type": "not_found_error",
///     "code": "404"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// The error details
    pub error: ErrorDetail,
}

impl ErrorResponse {
    fn new(message: &str, error_type: &str, status: StatusCode) -> Self {
        Self {
            error: ErrorDetail {
                message: message.to_string(),
                error_type: error_type.to_string(),
                code: Some(status.as_u16().to_string()),
            },
        }
    }
}

/// エラー詳細
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    /// Human-readable error message
    pub message: String,
    /// Error type (e.g., "not_found_error", "service_unavailable")
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error code (HTTP status as string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (Client Record Store)
pub type ServiceResult<T> = Result<T, ClientServiceError>;

/// Result type alias (API gateway)
pub type GatewayResult<T> = Result<T, GatewayError>;
