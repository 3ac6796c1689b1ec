//! ディスカバリ由来のルート導出
//!
//! 静的なルート表は持たない。レジストリのスナップショットから
//! サービス名ごとに1本のルートを都度導出する。

use crate::registry::RegistrySnapshot;
use client_platform_common::{
    config::DiscoveryLocatorProperties,
    error::{GatewayError, GatewayResult},
};
use serde::Serialize;

/// 導出されたルート定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    /// ルートID（`{route_id_prefix}{service_name}`）
    pub id: String,
    /// 転送先のサービス名（レジストリ上の表記のまま）
    pub service_name: String,
    /// マッチするパスプレフィックス（`/{service_id}`）
    pub path_prefix: String,
    /// 転送先URI（`lb://{service_name}`）
    pub uri: String,
}

impl RouteDefinition {
    fn segment(&self) -> &str {
        self.path_prefix.trim_start_matches('/')
    }
}

/// ルート解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    /// マッチしたルート
    pub route: &'a RouteDefinition,
    /// プレフィックスを除去した転送先パス（クエリ付き）
    pub downstream_path: String,
}

/// ルート表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    /// ルート定義一覧
    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    /// ルート数
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// ルートが無いか
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// リクエストパスに対応するルートを解決し、転送先パスを組み立てる
    ///
    /// 先頭セグメントの完全一致で判定する。どのルートにも一致しないセグメントは
    /// 「インスタンスが存在しないサービス」として `ServiceUnavailable` になる。
    pub fn resolve(&self, path_and_query: &str) -> GatewayResult<ResolvedRoute<'_>> {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        let trimmed = path.trim_start_matches('/');
        let (segment, rest) = match trimmed.split_once('/') {
            Some((segment, rest)) => (segment, rest),
            None => (trimmed, ""),
        };

        if segment.is_empty() {
            return Err(GatewayError::RouteNotFound(path.to_string()));
        }

        let route = self
            .routes
            .iter()
            .find(|r| r.segment() == segment)
            .ok_or_else(|| GatewayError::ServiceUnavailable(segment.to_string()))?;

        let mut downstream_path = format!("/{}", rest);
        if let Some(query) = query {
            downstream_path.push('?');
            downstream_path.push_str(query);
        }

        Ok(ResolvedRoute {
            route,
            downstream_path,
        })
    }
}

/// スナップショットからルート表を導出する（純粋関数）
pub fn routes_from_snapshot(
    snapshot: &RegistrySnapshot,
    properties: &DiscoveryLocatorProperties,
) -> RouteTable {
    let routes = snapshot
        .service_names()
        .map(|service_name| {
            let service_id = if properties.lower_case_service_id {
                service_name.to_lowercase()
            } else {
                service_name.to_string()
            };
            RouteDefinition {
                id: format!("{}{}", properties.route_id_prefix, service_name),
                service_name: service_name.to_string(),
                path_prefix: format!("/{}", service_id),
                uri: format!("lb://{}", service_name),
            }
        })
        .collect();

    RouteTable { routes }
}
