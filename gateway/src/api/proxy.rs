//! リクエスト転送
//!
//! 固定ルート以外のリクエストはすべてここに到達する。
//! 先頭パスセグメントでサービスを決め、正常インスタンスへ転送して応答をそのまま返す。

use super::error::AppError;
use crate::routes::routes_from_snapshot;
use crate::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::Response,
};
use client_platform_common::error::GatewayError;
use futures::TryStreamExt;
use std::io;
use tracing::debug;

/// 転送するリクエストボディの上限（ルーターの`DefaultBodyLimit`に設定する）
pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

/// 転送しないホップバイホップヘッダー
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// fallback - サービス名プレフィックスで解決して転送
pub async fn forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    // 上限超過は転送先を解決する前に413で返す
    let body = body?;
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let snapshot = state.registry.snapshot().await;
    let table = routes_from_snapshot(&snapshot, &state.discovery);
    let resolved = table.resolve(path_and_query)?;

    let candidates = snapshot.healthy_instances(&resolved.route.service_name);
    let instance = state
        .balancer
        .select(&resolved.route.service_name, &candidates)?;

    let url = format!("{}{}", instance.base_url(), resolved.downstream_path);
    debug!(
        route_id = %resolved.route.id,
        instance_id = %instance.id,
        method = %method,
        url = %url,
        "Forwarding request"
    );

    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| GatewayError::Internal(format!("Unsupported method: {}", e)))?;

    let response = state
        .http_client
        .request(method, &url)
        .headers(forwarded_request_headers(&headers))
        .body(body)
        .send()
        .await
        .map_err(|e| map_send_error(&resolved.route.service_name, e))?;

    Ok(forward_streaming_response(response))
}

fn map_send_error(service_name: &str, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(format!("{} did not respond in time: {}", service_name, err))
    } else {
        GatewayError::Http(format!("Failed to forward to {}: {}", service_name, err))
    }
}

/// 受信ヘッダーから転送用ヘッダーを作る（Host・Content-Length・ホップバイホップを除く）
fn forwarded_request_headers(headers: &HeaderMap) -> reqwest::header::HeaderMap {
    let mut forwarded = reqwest::header::HeaderMap::new();
    for (name, value) in headers.iter() {
        let key = name.as_str();
        if is_hop_by_hop(key) || key == "host" || key == "content-length" {
            continue;
        }
        if let (Ok(header_name), Ok(header_value)) = (
            reqwest::header::HeaderName::from_bytes(key.as_bytes()),
            reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            forwarded.append(header_name, header_value);
        }
    }
    forwarded
}

/// 上流レスポンスのステータス・ヘッダー・ボディをそのまま返す
fn forward_streaming_response(response: reqwest::Response) -> Response {
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut headers = HeaderMap::new();
    for (name, value) in response.headers().iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(header_name), Ok(header_value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(header_name, header_value);
        }
    }

    let stream = response.bytes_stream().map_err(io::Error::other);
    let mut axum_response = Response::new(Body::from_stream(stream));
    *axum_response.status_mut() = status;
    *axum_response.headers_mut() = headers;
    axum_response
}
