//! クライアントサービス
//!
//! リポジトリ上の業務契約。存在しないIDは `NotFound` として区別して返す。

use crate::db::traits::ClientRepository;
use client_platform_common::error::{ClientServiceError, ServiceResult};
use client_platform_common::types::{Client, NewClient};
use std::sync::Arc;
use tracing::{debug, info};

/// クライアントサービス
#[derive(Clone)]
pub struct ClientService {
    repository: Arc<dyn ClientRepository>,
}

impl ClientService {
    /// リポジトリを受け取ってサービスを作成
    pub fn new(repository: Arc<dyn ClientRepository>) -> Self {
        Self { repository }
    }

    /// 全クライアントを取得（0件なら空）
    pub async fn list_clients(&self) -> ServiceResult<Vec<Client>> {
        self.repository.find_all().await
    }

    /// IDでクライアントを取得
    pub async fn get_client(&self, id: i64) -> ServiceResult<Client> {
        match self.repository.find_by_id(id).await? {
            Some(client) => Ok(client),
            None => {
                debug!(client_id = id, "Client lookup missed");
                Err(ClientServiceError::NotFound(id))
            }
        }
    }

    /// クライアントを作成
    ///
    /// 重複排除は行わない。同じ内容でも呼び出しごとに別IDのレコードになる。
    pub async fn create_client(&self, candidate: NewClient) -> ServiceResult<Client> {
        let client = self.repository.save(&candidate).await?;
        info!(client_id = client.id, "Client created");
        Ok(client)
    }
}
