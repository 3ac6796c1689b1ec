//! ディスカバリレジストリへの自己登録
//!
//! ゲートウェイのレジストリAPIに対して登録・ハートビート・登録解除を行う。
//! 登録失敗でサービス提供が止まることはなく、次のハートビート周期で再試行する。

use client_platform_common::{
    error::{ClientServiceError, ServiceResult},
    protocol::{RegisterInstanceRequest, RegisterInstanceResponse},
    shutdown::ShutdownController,
};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// レジストリ呼び出しのタイムアウト
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// ハートビート送信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    /// レジストリが受理した
    Acknowledged,
    /// レジストリがインスタンスを知らない（退避済み・再起動など）
    UnknownInstance,
}

/// レジストリクライアント
#[derive(Clone)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    registry_url: String,
    registration: RegisterInstanceRequest,
}

impl DiscoveryClient {
    /// 新しいクライアントを作成
    pub fn new(
        registry_url: impl Into<String>,
        registration: RegisterInstanceRequest,
    ) -> ServiceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientServiceError::Internal(e.to_string()))?;

        Ok(Self {
            http,
            registry_url: registry_url.into().trim_end_matches('/').to_string(),
            registration,
        })
    }

    fn instances_url(&self) -> String {
        format!("{}/registry/instances", self.registry_url)
    }

    /// インスタンスを登録し、払い出されたIDを返す
    pub async fn register(&self) -> ServiceResult<Uuid> {
        let response = self
            .http
            .post(self.instances_url())
            .json(&self.registration)
            .send()
            .await
            .map_err(|e| ClientServiceError::Registration(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientServiceError::Registration(format!(
                "registry responded with {}",
                response.status()
            )));
        }

        let body: RegisterInstanceResponse = response
            .json()
            .await
            .map_err(|e| ClientServiceError::Registration(e.to_string()))?;

        info!(
            instance_id = %body.instance_id,
            service = %self.registration.service_name,
            status = ?body.status,
            "Registered with discovery registry"
        );
        Ok(body.instance_id)
    }

    /// ハートビートを送信
    pub async fn heartbeat(&self, instance_id: Uuid) -> ServiceResult<HeartbeatOutcome> {
        let response = self
            .http
            .put(format!("{}/{}/heartbeat", self.instances_url(), instance_id))
            .send()
            .await
            .map_err(|e| ClientServiceError::Heartbeat(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(HeartbeatOutcome::Acknowledged),
            StatusCode::NOT_FOUND => Ok(HeartbeatOutcome::UnknownInstance),
            status => Err(ClientServiceError::Heartbeat(format!(
                "registry responded with {}",
                status
            ))),
        }
    }

    /// 登録を解除（未登録扱いの404も成功とみなす）
    pub async fn deregister(&self, instance_id: Uuid) -> ServiceResult<()> {
        let response = self
            .http
            .delete(format!("{}/{}", self.instances_url(), instance_id))
            .send()
            .await
            .map_err(|e| ClientServiceError::Registration(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            info!(instance_id = %instance_id, "Deregistered from discovery registry");
            Ok(())
        } else {
            Err(ClientServiceError::Registration(format!(
                "registry responded with {}",
                status
            )))
        }
    }

    /// 1周期分の処理。未登録なら登録し、登録済みならハートビートを送る。
    ///
    /// 戻り値は次周期で使うインスタンスID。失敗はログのみで、呼び出し側には伝播しない。
    pub async fn tick(&self, current: Option<Uuid>) -> Option<Uuid> {
        let Some(instance_id) = current else {
            return match self.register().await {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "Registration failed, will retry");
                    None
                }
            };
        };

        match self.heartbeat(instance_id).await {
            Ok(HeartbeatOutcome::Acknowledged) => {
                debug!(instance_id = %instance_id, "Heartbeat acknowledged");
                Some(instance_id)
            }
            Ok(HeartbeatOutcome::UnknownInstance) => {
                warn!(instance_id = %instance_id, "Registry forgot this instance, re-registering");
                match self.register().await {
                    Ok(id) => Some(id),
                    Err(e) => {
                        warn!(error = %e, "Re-registration failed, will retry");
                        None
                    }
                }
            }
            Err(e) => {
                // 一時的な失敗では登録IDを保持したまま次周期を待つ
                warn!(instance_id = %instance_id, error = %e, "Heartbeat failed");
                Some(instance_id)
            }
        }
    }

    /// 登録・ハートビートループを実行し、シャットダウン時に登録解除する
    pub async fn run(self, interval: Duration, shutdown: ShutdownController) {
        let mut ticker = tokio::time::interval(interval);
        let mut instance_id = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    instance_id = self.tick(instance_id).await;
                }
                _ = shutdown.wait() => break,
            }
        }

        if let Some(id) = instance_id {
            if let Err(e) = self.deregister(id).await {
                warn!(instance_id = %id, error = %e, "Deregistration failed");
            }
        }
    }

    /// バックグラウンドタスクとして起動
    pub fn start(self, interval: Duration, shutdown: ShutdownController) -> JoinHandle<()> {
        tokio::spawn(self.run(interval, shutdown))
    }
}
