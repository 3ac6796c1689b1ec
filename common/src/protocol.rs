//! 通信プロトコル定義
//!
//! サービス↔ゲートウェイ（ディスカバリレジストリ）間の通信メッセージ

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// インスタンス登録リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterInstanceRequest {
    /// 論理サービス名
    pub service_name: String,
    /// ホスト名またはIPアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// 任意のメタデータ
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// インスタンス登録レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterInstanceResponse {
    /// インスタンスID
    pub instance_id: Uuid,
    /// ステータス ("registered" または "updated")
    pub status: RegisterStatus,
}

/// 登録ステータス
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegisterStatus {
    /// 新規登録
    Registered,
    /// 既存インスタンス更新（同一サービス名・ホスト・ポート）
    Updated,
}
