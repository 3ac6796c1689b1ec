//! 共通型定義
//!
//! Client, ServiceInstance等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// クライアント
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    /// ストアが採番する一意識別子（作成後は不変）
    pub id: i64,
    /// 名前
    pub name: String,
    /// メールアドレス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// クライアント作成リクエスト（ID無し）
///
/// ボディに`id`が含まれていても無視される。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewClient {
    /// 名前
    pub name: String,
    /// メールアドレス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl NewClient {
    /// 名前のみを指定して作成
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    /// 採番されたIDと結合して永続化済みクライアントにする
    pub fn into_client(self, id: i64) -> Client {
        Client {
            id,
            name: self.name,
            email: self.email,
        }
    }
}

/// サービスインスタンス（ディスカバリレジストリの1エントリ）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInstance {
    /// 一意識別子（レジストリが採番）
    pub id: Uuid,
    /// 論理サービス名
    pub service_name: String,
    /// ホスト名またはIPアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// 状態
    pub status: InstanceStatus,
    /// 登録日時
    pub registered_at: DateTime<Utc>,
    /// 最終ハートビート時刻
    pub last_heartbeat: DateTime<Utc>,
    /// 任意のメタデータ
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl ServiceInstance {
    /// 転送先のベースURL
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// 転送対象として選択可能か
    pub fn is_healthy(&self) -> bool {
        self.status == InstanceStatus::Up
    }
}

/// インスタンス状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceStatus {
    /// 稼働中
    Up,
    /// ハートビート途絶
    Down,
}
