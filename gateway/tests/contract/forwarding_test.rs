//! 転送 の Contract Tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::{Duration as ChronoDuration, Utc};
use client_platform_common::config::GatewayConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::gateway::{create_test_gateway, create_test_gateway_with, register_backend};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn unknown_service_is_unavailable_promptly() {
    let (app, _registry) = create_test_gateway();

    let started = Instant::now();
    let response = app.oneshot(get("/billing/anything")).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "service_unavailable");
    assert_eq!(body["error"]["code"], "503");
}

#[tokio::test]
async fn root_path_is_not_found() {
    let (app, _registry) = create_test_gateway();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn forwards_get_with_prefix_stripped() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/client/1"))
        .and(query_param("verbose", "true"))
        .and(header("x-request-id", "req-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "name": "Alice"}))
                .insert_header("x-backend", "client-service"),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let (app, registry) = create_test_gateway();
    register_backend(&registry, "client-service", *backend.address()).await;

    let request = Request::builder()
        .uri("/client-service/api/client/1?verbose=true")
        .header("x-request-id", "req-1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-backend"], "client-service");
    assert_eq!(json_body(response).await, json!({"id": 1, "name": "Alice"}));
}

#[tokio::test]
async fn forwards_post_body_and_relays_status() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/client"))
        .and(body_json(json!({"name": "Alice"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1, "name": "Alice"})))
        .expect(1)
        .mount(&backend)
        .await;

    let (app, registry) = create_test_gateway();
    register_backend(&registry, "client-service", *backend.address()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/client-service/api/client")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Alice"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn backend_error_status_is_relayed_unchanged() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/client/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "Client not found", "type": "not_found_error", "code": "404"}
        })))
        .mount(&backend)
        .await;

    let (app, registry) = create_test_gateway();
    register_backend(&registry, "client-service", *backend.address()).await;

    let response = app
        .oneshot(get("/client-service/api/client/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["type"], "not_found_error");
}

#[tokio::test]
async fn round_robin_across_instances() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    for (server, name) in [(&first, "first"), (&second, "second")] {
        Mock::given(method("GET"))
            .and(path("/whoami"))
            .respond_with(ResponseTemplate::new(200).set_body_string(name))
            .expect(2)
            .mount(server)
            .await;
    }

    let (app, registry) = create_test_gateway();
    register_backend(&registry, "client-service", *first.address()).await;
    register_backend(&registry, "client-service", *second.address()).await;

    for _ in 0..4 {
        let response = app
            .clone()
            .oneshot(get("/client-service/whoami"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn down_instances_are_skipped() {
    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&healthy)
        .await;

    let (app, registry) = create_test_gateway();
    let stale = register_backend(&registry, "client-service", "127.0.0.1:9".parse().unwrap()).await;

    // 登録直後の別インスタンスだけが新しいハートビートを持つ状態を作る
    let future = Utc::now() + ChronoDuration::seconds(120);
    registry
        .sweep(future, ChronoDuration::seconds(90), ChronoDuration::seconds(300))
        .await;
    register_backend(&registry, "client-service", *healthy.address()).await;

    assert!(!registry.get(stale.instance_id).await.unwrap().is_healthy());
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get("/client-service/ping"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn all_instances_down_is_unavailable() {
    let (app, registry) = create_test_gateway();
    register_backend(&registry, "client-service", "127.0.0.1:9".parse().unwrap()).await;
    registry
        .sweep(
            Utc::now() + ChronoDuration::seconds(120),
            ChronoDuration::seconds(90),
            ChronoDuration::seconds(300),
        )
        .await;

    let response = app.oneshot(get("/client-service/api/client")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() {
    let (app, registry) = create_test_gateway();
    // 何も待ち受けていないポート
    let closed: SocketAddr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    register_backend(&registry, "client-service", closed).await;

    let response = app.oneshot(get("/client-service/api/client")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        json_body(response).await["error"]["message"],
        "Backend service unavailable"
    );
}

#[tokio::test]
async fn slow_backend_is_gateway_timeout() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&backend)
        .await;

    let (app, registry) = create_test_gateway_with(GatewayConfig {
        request_timeout_secs: 1,
        ..Default::default()
    });
    register_backend(&registry, "client-service", *backend.address()).await;

    let response = app.oneshot(get("/client-service/slow")).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend)
        .await;

    let (app, registry) = create_test_gateway();
    register_backend(&registry, "client-service", *backend.address()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/client-service/api/client")
        .header("content-type", "application/octet-stream")
        .body(Body::from(vec![b'a'; 11 * 1024 * 1024]))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], "413");
}

#[tokio::test]
async fn body_above_axum_default_limit_is_still_forwarded() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend)
        .await;

    let (app, registry) = create_test_gateway();
    register_backend(&registry, "files", *backend.address()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/files/upload")
        .body(Body::from(vec![b'a'; 3 * 1024 * 1024]))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
