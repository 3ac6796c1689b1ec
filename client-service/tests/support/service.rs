use axum::Router;
use client_service::{api, db, AppState};
use sqlx::SqlitePool;

/// インメモリDBでクライアントサービスのルーターを組み立てる
#[allow(dead_code)]
pub async fn create_test_service() -> (Router, SqlitePool) {
    let pool = db::create_pool("sqlite::memory:")
        .await
        .expect("create in-memory pool");
    let app = api::create_app(AppState::from_pool(pool.clone()));
    (app, pool)
}
