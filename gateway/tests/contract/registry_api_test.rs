//! レジストリAPI の Contract Tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::support::gateway::create_test_gateway;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn register(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/registry/instances")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn register_returns_instance_id() {
    let (app, _registry) = create_test_gateway();

    let (status, body) = send(
        &app,
        register(json!({"service_name": "client-service", "host": "127.0.0.1", "port": 8081})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "registered");
    assert!(body["instance_id"].as_str().is_some());
}

#[tokio::test]
async fn reregister_same_address_is_updated() {
    let (app, registry) = create_test_gateway();
    let payload = json!({"service_name": "client-service", "host": "127.0.0.1", "port": 8081});

    let (_, first) = send(&app, register(payload.clone())).await;
    let (_, second) = send(&app, register(payload)).await;

    assert_eq!(second["status"], "updated");
    assert_eq!(first["instance_id"], second["instance_id"]);
    assert_eq!(registry.list().await.len(), 1);
}

#[tokio::test]
async fn register_invalid_service_name_is_bad_request() {
    let (app, _registry) = create_test_gateway();

    let (status, body) = send(
        &app,
        register(json!({"service_name": "a/b", "host": "127.0.0.1", "port": 8081})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn register_reserved_service_name_is_bad_request() {
    let (app, registry) = create_test_gateway();

    for name in ["registry", "health", "Registry"] {
        let (status, body) = send(
            &app,
            register(json!({"service_name": name, "host": "127.0.0.1", "port": 8081})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name} should be rejected");
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }
    assert!(registry.list().await.is_empty());
}

#[tokio::test]
async fn register_missing_port_is_unprocessable_with_error_body() {
    let (app, _registry) = create_test_gateway();

    let (status, body) = send(
        &app,
        register(json!({"service_name": "client-service", "host": "127.0.0.1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], "422");
}

#[tokio::test]
async fn heartbeat_with_malformed_id_is_bad_request_with_error_body() {
    let (app, _registry) = create_test_gateway();

    let (status, body) = send(&app, empty("PUT", "/registry/instances/not-a-uuid/heartbeat")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], "400");

    let (status, body) = send(&app, empty("DELETE", "/registry/instances/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn heartbeat_and_deregister_lifecycle() {
    let (app, _registry) = create_test_gateway();
    let (_, registered) = send(
        &app,
        register(json!({"service_name": "client-service", "host": "127.0.0.1", "port": 8081})),
    )
    .await;
    let id = registered["instance_id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, empty("PUT", &format!("/registry/instances/{id}/heartbeat"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, empty("DELETE", &format!("/registry/instances/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) =
        send(&app, empty("PUT", &format!("/registry/instances/{id}/heartbeat"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found_error");

    let (status, _) = send(&app, empty("DELETE", &format!("/registry/instances/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn services_and_routes_reflect_registry() {
    let (app, _registry) = create_test_gateway();
    for (service, port) in [("Client-Service", 8081), ("client-service-b", 8082)] {
        send(
            &app,
            register(json!({"service_name": service, "host": "127.0.0.1", "port": port})),
        )
        .await;
    }

    let (status, services) = send(&app, empty("GET", "/registry/services")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(services["Client-Service"][0]["port"], 8081);
    assert_eq!(services["Client-Service"][0]["status"], "UP");

    let (status, routes) = send(&app, empty("GET", "/registry/routes")).await;
    assert_eq!(status, StatusCode::OK);
    let routes = routes.as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0]["id"], "discovery_Client-Service");
    assert_eq!(routes[0]["path_prefix"], "/client-service");
    assert_eq!(routes[0]["uri"], "lb://Client-Service");
}

#[tokio::test]
async fn health_is_up_with_empty_registry() {
    let (app, _registry) = create_test_gateway();

    let (status, body) = send(&app, empty("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["instances"]["total"], 0);
}
