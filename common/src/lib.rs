//! Client Platform 共通ライブラリ
//!
//! クライアントサービスとAPIゲートウェイで共有する型・プロトコル・設定・エラー

#![warn(missing_docs)]

/// 共通型定義（Client, ServiceInstance）
pub mod types;

/// サービス登録プロトコル（サービス↔ゲートウェイ）
pub mod protocol;

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// ロギング初期化ユーティリティ
pub mod logging;

/// シャットダウンシグナル待機
pub mod shutdown;
