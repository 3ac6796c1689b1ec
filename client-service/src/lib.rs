//! Client Record Store Server
//!
//! クライアントの一覧・取得・作成をHTTP/JSONで提供するサービス

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// CLIインターフェース
pub mod cli;

/// データベースアクセス
pub mod db;

/// ディスカバリレジストリへの自己登録（登録・ハートビート）
pub mod discovery;

/// axumサーバー起動
pub mod server;

/// クライアントサービス（業務契約）
pub mod service;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// クライアントサービス
    pub clients: service::ClientService,
    /// データベース接続プール（ヘルスチェック用）
    pub db_pool: sqlx::SqlitePool,
}

impl AppState {
    /// 接続プールからSQLiteリポジトリ・サービスを組み立てる
    pub fn from_pool(db_pool: sqlx::SqlitePool) -> Self {
        let repository = db::traits::SqliteClientRepository::new(db_pool.clone());
        Self {
            clients: service::ClientService::new(std::sync::Arc::new(repository)),
            db_pool,
        }
    }
}
