//! データベースアクセス層
//!
//! SQLiteベースのクライアント永続化

/// クライアントテーブル操作
pub mod clients;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;

use client_platform_common::error::{ClientServiceError, ServiceResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// コネクション取得待ちの上限
const ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// データベース接続プールを作成し、マイグレーションを実行する
///
/// インメモリDB（`sqlite::memory:`）はコネクションごとに別DBになるため、
/// 単一コネクションに固定し、アイドル切断も行わない。
pub async fn create_pool(database_url: &str) -> ServiceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(store_error)?
        .create_if_missing(true);

    let in_memory = database_url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS));
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(5)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(store_error)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| ClientServiceError::StoreUnavailable(format!("Migration failed: {}", e)))?;

    Ok(pool)
}

/// ストアへの疎通確認
pub async fn ping(pool: &SqlitePool) -> ServiceResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(store_error)?;
    Ok(())
}

pub(crate) fn store_error(err: sqlx::Error) -> ClientServiceError {
    ClientServiceError::StoreUnavailable(err.to_string())
}
