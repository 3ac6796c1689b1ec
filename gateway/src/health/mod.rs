//! インスタンスヘルスモニター
//!
//! ハートビートが途絶えたインスタンスを定期的にDownにし、長期間途絶えたものを退避する。

use crate::balancer::RoundRobinBalancer;
use crate::registry::ServiceRegistry;
use chrono::Utc;
use client_platform_common::{config::GatewayConfig, shutdown::ShutdownController};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// インスタンスヘルスモニター
#[derive(Clone)]
pub struct InstanceHealthMonitor {
    registry: ServiceRegistry,
    balancer: Option<RoundRobinBalancer>,
    check_interval: Duration,
    instance_timeout: chrono::Duration,
    eviction_timeout: chrono::Duration,
}

impl InstanceHealthMonitor {
    /// 新しいモニターを作成
    pub fn new(
        registry: ServiceRegistry,
        check_interval: Duration,
        instance_timeout: Duration,
        eviction_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            balancer: None,
            check_interval,
            instance_timeout: to_chrono(instance_timeout),
            eviction_timeout: to_chrono(eviction_timeout),
        }
    }

    /// ゲートウェイ設定から作成
    pub fn from_config(registry: ServiceRegistry, config: &GatewayConfig) -> Self {
        Self::new(
            registry,
            Duration::from_secs(config.health_check_interval_secs),
            Duration::from_secs(config.instance_timeout_secs),
            Duration::from_secs(config.eviction_timeout_secs),
        )
    }

    /// 退避したサービスのラウンドロビンカーソルも掃除する
    pub fn with_balancer(mut self, balancer: RoundRobinBalancer) -> Self {
        self.balancer = Some(balancer);
        self
    }

    /// 1回分の判定
    pub async fn check_once(&self) {
        let report = self
            .registry
            .sweep(Utc::now(), self.instance_timeout, self.eviction_timeout)
            .await;

        for id in &report.marked_down {
            warn!(instance_id = %id, "Instance heartbeat timed out, marked DOWN");
        }
        for id in &report.evicted {
            info!(instance_id = %id, "Instance evicted from registry");
        }
        if report.marked_down.is_empty() && report.evicted.is_empty() {
            debug!("Health sweep found no stale instances");
        }

        if let Some(balancer) = &self.balancer {
            let snapshot = self.registry.snapshot().await;
            let pruned = balancer.retain_services(snapshot.service_names());
            if pruned > 0 {
                debug!(pruned, "Dropped balancer cursors for departed services");
            }
        }
    }

    /// バックグラウンドで監視を開始
    pub fn start(self, shutdown: ShutdownController) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = interval(self.check_interval);

            info!(
                interval_secs = self.check_interval.as_secs(),
                "Instance health monitor started"
            );

            loop {
                tokio::select! {
                    _ = timer.tick() => self.check_once().await,
                    _ = shutdown.wait() => break,
                }
            }

            info!("Instance health monitor stopped");
        })
    }
}

/// 表現できない長さは実質無期限として扱う
fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::weeks(52 * 1000))
}
