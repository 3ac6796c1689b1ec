//! ディスカバリレジストリ
//!
//! サービスインスタンスの状態をメモリ内で管理する。
//! ルート導出とインスタンス選択はすべてこのレジストリのスナップショットを入力とする。

use chrono::{DateTime, Duration, Utc};
use client_platform_common::{
    config::validate_service_name,
    error::{CommonError, GatewayError, GatewayResult},
    protocol::{RegisterInstanceRequest, RegisterInstanceResponse, RegisterStatus},
    types::{InstanceStatus, ServiceInstance},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// ある時点のレジストリ内容（サービス名 → インスタンス一覧）
///
/// サービス名の辞書順、各サービス内は登録順で並ぶ。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegistrySnapshot {
    services: BTreeMap<String, Vec<ServiceInstance>>,
}

impl RegistrySnapshot {
    /// インスタンス列からスナップショットを作成
    pub fn from_instances(instances: impl IntoIterator<Item = ServiceInstance>) -> Self {
        let mut services: BTreeMap<String, Vec<ServiceInstance>> = BTreeMap::new();
        for instance in instances {
            services
                .entry(instance.service_name.clone())
                .or_default()
                .push(instance);
        }
        for group in services.values_mut() {
            group.sort_by(|a, b| a.registered_at.cmp(&b.registered_at).then(a.id.cmp(&b.id)));
        }
        Self { services }
    }

    /// 登録されているサービス名
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// サービスの全インスタンス
    pub fn instances(&self, service_name: &str) -> &[ServiceInstance] {
        self.services
            .get(service_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// サービスの正常（Up）インスタンス
    pub fn healthy_instances(&self, service_name: &str) -> Vec<ServiceInstance> {
        self.instances(service_name)
            .iter()
            .filter(|i| i.is_healthy())
            .cloned()
            .collect()
    }
}

/// ヘルスモニターによる1回の掃除結果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Downにしたインスタンス
    pub marked_down: Vec<Uuid>,
    /// 退避（削除）したインスタンス
    pub evicted: Vec<Uuid>,
}

/// サービスインスタンスレジストリ
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    instances: Arc<RwLock<HashMap<Uuid, ServiceInstance>>>,
}

impl ServiceRegistry {
    /// 新しいレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// インスタンスを登録
    ///
    /// 同じサービス名・ホスト・ポートの登録が既にあれば、そのIDのまま更新する。
    pub async fn register(
        &self,
        req: RegisterInstanceRequest,
    ) -> GatewayResult<RegisterInstanceResponse> {
        validate_service_name(&req.service_name)?;
        if req.host.trim().is_empty() {
            return Err(CommonError::Validation(
                "host cannot be empty".to_string(),
            )
            .into());
        }

        let now = Utc::now();
        let mut instances = self.instances.write().await;

        let existing = instances
            .values_mut()
            .find(|i| i.service_name == req.service_name && i.host == req.host && i.port == req.port);

        let response = match existing {
            Some(instance) => {
                instance.status = InstanceStatus::Up;
                instance.last_heartbeat = now;
                instance.metadata = req.metadata;
                RegisterInstanceResponse {
                    instance_id: instance.id,
                    status: RegisterStatus::Updated,
                }
            }
            None => {
                let instance = ServiceInstance {
                    id: Uuid::new_v4(),
                    service_name: req.service_name,
                    host: req.host,
                    port: req.port,
                    status: InstanceStatus::Up,
                    registered_at: now,
                    last_heartbeat: now,
                    metadata: req.metadata,
                };
                let id = instance.id;
                instances.insert(id, instance);
                RegisterInstanceResponse {
                    instance_id: id,
                    status: RegisterStatus::Registered,
                }
            }
        };

        if let Some(instance) = instances.get(&response.instance_id) {
            info!(
                instance_id = %instance.id,
                service = %instance.service_name,
                address = %instance.base_url(),
                status = ?response.status,
                "Instance registered"
            );
        }
        Ok(response)
    }

    /// ハートビートを記録し、Downだったインスタンスを復帰させる
    pub async fn heartbeat(&self, instance_id: Uuid) -> GatewayResult<()> {
        let mut instances = self.instances.write().await;
        let instance = instances
            .get_mut(&instance_id)
            .ok_or(GatewayError::InstanceNotFound(instance_id))?;

        if instance.status == InstanceStatus::Down {
            info!(instance_id = %instance_id, service = %instance.service_name, "Instance is back up");
        }
        instance.last_heartbeat = Utc::now();
        instance.status = InstanceStatus::Up;
        Ok(())
    }

    /// 登録を解除
    pub async fn deregister(&self, instance_id: Uuid) -> GatewayResult<ServiceInstance> {
        let removed = self
            .instances
            .write()
            .await
            .remove(&instance_id)
            .ok_or(GatewayError::InstanceNotFound(instance_id))?;

        info!(
            instance_id = %instance_id,
            service = %removed.service_name,
            "Instance deregistered"
        );
        Ok(removed)
    }

    /// インスタンスを取得
    pub async fn get(&self, instance_id: Uuid) -> GatewayResult<ServiceInstance> {
        self.instances
            .read()
            .await
            .get(&instance_id)
            .cloned()
            .ok_or(GatewayError::InstanceNotFound(instance_id))
    }

    /// 全インスタンスを取得
    pub async fn list(&self) -> Vec<ServiceInstance> {
        self.instances.read().await.values().cloned().collect()
    }

    /// 現時点のスナップショットを取得
    pub async fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::from_instances(self.list().await)
    }

    /// 最終ハートビートが古いインスタンスをDownにし、さらに古いものは退避する
    pub async fn sweep(
        &self,
        now: DateTime<Utc>,
        instance_timeout: Duration,
        eviction_timeout: Duration,
    ) -> SweepReport {
        let mut report = SweepReport::default();
        let mut instances = self.instances.write().await;

        instances.retain(|id, instance| {
            let silent_for = now - instance.last_heartbeat;
            if silent_for > eviction_timeout {
                report.evicted.push(*id);
                return false;
            }
            if silent_for > instance_timeout && instance.status == InstanceStatus::Up {
                instance.status = InstanceStatus::Down;
                report.marked_down.push(*id);
            }
            true
        });

        report
    }
}
