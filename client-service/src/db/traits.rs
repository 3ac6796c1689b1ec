//! Repository traitパターン定義
//!
//! DB操作を抽象化し、サービス層をストア実装から切り離す。

use async_trait::async_trait;
use client_platform_common::error::ServiceResult;
use client_platform_common::types::{Client, NewClient};
use sqlx::SqlitePool;

use super::{clients, store_error};

/// クライアント永続化のRepository trait
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// すべてのクライアントを取得
    async fn find_all(&self) -> ServiceResult<Vec<Client>>;
    /// IDでクライアントを検索
    async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Client>>;
    /// クライアントを保存し、採番済みのレコードを返す
    async fn save(&self, candidate: &NewClient) -> ServiceResult<Client>;
}

/// SQLiteによるClientRepository実装
#[derive(Clone)]
pub struct SqliteClientRepository {
    pool: SqlitePool,
}

impl SqliteClientRepository {
    /// 接続プールからリポジトリを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for SqliteClientRepository {
    async fn find_all(&self) -> ServiceResult<Vec<Client>> {
        clients::list_clients(&self.pool).await.map_err(store_error)
    }

    async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Client>> {
        clients::get_client(&self.pool, id)
            .await
            .map_err(store_error)
    }

    async fn save(&self, candidate: &NewClient) -> ServiceResult<Client> {
        clients::create_client(&self.pool, candidate)
            .await
            .map_err(store_error)
    }
}
