//! ゲートウェイ経由でクライアントサービスを利用する統合テスト

use api_gateway::server as gateway_server;
use client_platform_common::{
    config::{ClientServiceConfig, GatewayConfig},
    shutdown::ShutdownController,
};
use client_service::{api, db, server as service_server, AppState as ServiceState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use crate::support::{
    gateway::{create_test_gateway, register_backend},
    http::spawn_router,
};

#[tokio::test]
async fn create_and_fetch_client_through_gateway() {
    let pool = db::create_pool("sqlite::memory:").await.unwrap();
    let service = spawn_router(api::create_app(ServiceState::from_pool(pool))).await;

    let (gateway_app, registry) = create_test_gateway();
    register_backend(&registry, "client-service", service.addr()).await;
    let gateway = spawn_router(gateway_app).await;

    let http = reqwest::Client::new();

    let created = http
        .post(gateway.url("/client-service/api/client"))
        .json(&json!({"name": "Alice"}))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(created.json::<Value>().await.unwrap(), json!({"id": 1, "name": "Alice"}));

    let fetched = http
        .get(gateway.url("/client-service/api/client/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>().await.unwrap()["name"], "Alice");

    let missing = http
        .get(gateway.url("/client-service/api/client/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let unknown = http
        .get(gateway.url("/billing/anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::SERVICE_UNAVAILABLE);

    gateway.stop().await;
    service.stop().await;
}

#[tokio::test]
async fn service_self_registers_with_running_gateway() {
    // ゲートウェイのポートを先に確定させる
    let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let gateway_port = reserved.local_addr().unwrap().port();
    drop(reserved);

    let gateway_shutdown = ShutdownController::default();
    let gateway_handle = tokio::spawn(gateway_server::run(
        GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: gateway_port,
            ..Default::default()
        },
        gateway_shutdown.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let service_shutdown = ShutdownController::default();
    let service_handle = tokio::spawn(service_server::run(
        ClientServiceConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            gateway_url: Some(format!("http://127.0.0.1:{}", gateway_port)),
            heartbeat_interval_secs: 1,
            ..Default::default()
        },
        service_shutdown.clone(),
    ));

    let http = reqwest::Client::new();
    let list_url = format!("http://127.0.0.1:{}/client-service/api/client", gateway_port);

    // 登録が反映されるまで待つ
    let mut status = StatusCode::SERVICE_UNAVAILABLE;
    for _ in 0..50 {
        status = http.get(&list_url).send().await.unwrap().status();
        if status == StatusCode::OK {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(status, StatusCode::OK);

    // 登録解除後は転送先が無くなる
    service_shutdown.request_shutdown();
    tokio::time::timeout(Duration::from_secs(5), service_handle)
        .await
        .expect("service did not stop")
        .unwrap()
        .unwrap();

    let after = http.get(&list_url).send().await.unwrap();
    assert_eq!(after.status(), StatusCode::SERVICE_UNAVAILABLE);

    gateway_shutdown.request_shutdown();
    tokio::time::timeout(Duration::from_secs(5), gateway_handle)
        .await
        .expect("gateway did not stop")
        .unwrap()
        .unwrap();
}
