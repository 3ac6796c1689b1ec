//! ディスカバリ登録の統合テスト

use client_platform_common::{
    config::ClientServiceConfig,
    protocol::{RegisterInstanceResponse, RegisterStatus},
    shutdown::ShutdownController,
};
use client_service::server;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(gateway_url: Option<String>) -> ClientServiceConfig {
    ClientServiceConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        gateway_url,
        heartbeat_interval_secs: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn registers_heartbeats_and_deregisters() {
    let registry = MockServer::start().await;
    let instance_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/registry/instances"))
        .and(body_partial_json(serde_json::json!({
            "service_name": "client-service",
            "host": "127.0.0.1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(RegisterInstanceResponse {
            instance_id,
            status: RegisterStatus::Registered,
        }))
        .expect(1)
        .mount(&registry)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/registry/instances/{}/heartbeat", instance_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1..)
        .mount(&registry)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/registry/instances/{}", instance_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&registry)
        .await;

    let shutdown = ShutdownController::default();
    let handle = tokio::spawn(server::run(test_config(Some(registry.uri())), shutdown.clone()));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    shutdown.request_shutdown();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("service did not stop")
        .unwrap()
        .unwrap();

    registry.verify().await;
}

/// 空きポートを確保してすぐ解放する
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn unreachable_registry_does_not_block_serving() {
    let port = free_port();
    // 何も待ち受けていないレジストリ
    let registry_url = format!("http://127.0.0.1:{}", free_port());
    let config = ClientServiceConfig {
        port,
        ..test_config(Some(registry_url))
    };
    let shutdown = ShutdownController::default();
    let handle = tokio::spawn(server::run(config, shutdown.clone()));

    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/api/client", port);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let response = loop {
        match client.get(&url).send().await {
            Ok(response) => break response,
            Err(_) if tokio::time::Instant::now() < deadline && !handle.is_finished() => {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Err(e) => panic!("client service never served {url}: {e}"),
        }
    };
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.json::<serde_json::Value>().await.unwrap(),
        serde_json::json!([])
    );

    shutdown.request_shutdown();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("service did not stop")
        .unwrap();
    assert!(result.is_ok());
}
