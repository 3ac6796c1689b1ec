//! インスタンス選択
//!
//! 正常インスタンスの中からラウンドロビンで転送先を選ぶ。

use client_platform_common::{
    error::{GatewayError, GatewayResult},
    types::ServiceInstance,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// サービスごとのラウンドロビンカーソル
#[derive(Clone, Default)]
pub struct RoundRobinBalancer {
    cursors: Arc<Mutex<HashMap<String, Arc<AtomicUsize>>>>,
}

impl RoundRobinBalancer {
    /// 新しいバランサーを作成
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_cursors(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<AtomicUsize>>> {
        match self.cursors.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn cursor(&self, service_name: &str) -> Arc<AtomicUsize> {
        // ロックはカーソル取得の間だけ保持する
        self.lock_cursors()
            .entry(service_name.to_string())
            .or_insert_with(|| Arc::new(AtomicUsize::new(0)))
            .clone()
    }

    /// 候補から1件選択する。候補が空なら `ServiceUnavailable`。
    pub fn select(
        &self,
        service_name: &str,
        candidates: &[ServiceInstance],
    ) -> GatewayResult<ServiceInstance> {
        if candidates.is_empty() {
            return Err(GatewayError::ServiceUnavailable(service_name.to_string()));
        }

        let index = self.cursor(service_name).fetch_add(1, Ordering::SeqCst) % candidates.len();
        Ok(candidates[index].clone())
    }

    /// 登録の無くなったサービスのカーソルを捨てる。削除した件数を返す。
    ///
    /// ヘルスモニターが掃除のたびに呼ぶため、カーソル数は登録中のサービス数で頭打ちになる。
    pub fn retain_services<'a>(&self, live: impl IntoIterator<Item = &'a str>) -> usize {
        let live: BTreeSet<&str> = live.into_iter().collect();
        let mut cursors = self.lock_cursors();
        let before = cursors.len();
        cursors.retain(|service_name, _| live.contains(service_name.as_str()));
        before - cursors.len()
    }

    #[cfg(test)]
    pub(crate) fn tracked_services(&self) -> usize {
        self.lock_cursors().len()
    }
}
