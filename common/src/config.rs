//! 設定管理
//!
//! ClientServiceConfig, GatewayConfig等の設定構造体
//!
//! 読み込み順序: 任意のTOMLファイル → 環境変数（`CLIENT_SERVICE__PORT` のように `__` 区切り）。
//! CLI引数による上書きは各バイナリ側で行う。

use crate::error::{CommonError, CommonResult};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// クライアントサービス用の環境変数プレフィックス
pub const CLIENT_SERVICE_ENV_PREFIX: &str = "CLIENT_SERVICE";

/// ゲートウェイ用の環境変数プレフィックス
pub const GATEWAY_ENV_PREFIX: &str = "GATEWAY";

/// クライアントサービス設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientServiceConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 8081)
    #[serde(default = "default_service_port")]
    pub port: u16,

    /// データベースURL (デフォルト: "sqlite://clients.db")
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// ディスカバリに登録する論理サービス名 (デフォルト: "client-service")
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// ゲートウェイ（ディスカバリレジストリ）のURL。未設定なら登録しない
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// レジストリへ広告するホスト名 (未設定時は "127.0.0.1")
    #[serde(default)]
    pub advertised_host: Option<String>,

    /// ハートビート送信間隔（秒）(デフォルト: 10)
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// ログレベル (デフォルト: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// ログファイル出力先ディレクトリ
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// APIゲートウェイ設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 8888)
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// ヘルスチェック間隔（秒）(デフォルト: 30)
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_secs: u64,

    /// ハートビート途絶でDownとみなすまでの秒数 (デフォルト: 90)
    #[serde(default = "default_instance_timeout")]
    pub instance_timeout_secs: u64,

    /// ハートビート途絶でレジストリから削除するまでの秒数 (デフォルト: 300)
    #[serde(default = "default_eviction_timeout")]
    pub eviction_timeout_secs: u64,

    /// 転送先への接続タイムアウト（秒）(デフォルト: 5)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// 転送リクエスト全体のタイムアウト（秒）(デフォルト: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// ログレベル (デフォルト: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// ログファイル出力先ディレクトリ
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// ディスカバリ由来ルート生成の設定
    #[serde(default)]
    pub discovery: DiscoveryLocatorProperties,
}

/// ディスカバリ由来ルート生成の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryLocatorProperties {
    /// ルートのパスプレフィックスにサービス名を小文字で使う (デフォルト: true)
    #[serde(default = "default_true")]
    pub lower_case_service_id: bool,

    /// ルートIDのプレフィックス (デフォルト: "discovery_")
    #[serde(default = "default_route_id_prefix")]
    pub route_id_prefix: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_service_port() -> u16 {
    8081
}

fn default_gateway_port() -> u16 {
    8888
}

fn default_database_url() -> String {
    "sqlite://clients.db".to_string()
}

fn default_service_name() -> String {
    "client-service".to_string()
}

fn default_heartbeat_interval() -> u64 {
    10
}

fn default_health_check_interval() -> u64 {
    30
}

fn default_instance_timeout() -> u64 {
    90
}

fn default_eviction_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_route_id_prefix() -> String {
    "discovery_".to_string()
}

impl Default for ClientServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_service_port(),
            database_url: default_database_url(),
            service_name: default_service_name(),
            gateway_url: None,
            advertised_host: None,
            heartbeat_interval_secs: default_heartbeat_interval(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_gateway_port(),
            health_check_interval_secs: default_health_check_interval(),
            instance_timeout_secs: default_instance_timeout(),
            eviction_timeout_secs: default_eviction_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            log_dir: None,
            discovery: DiscoveryLocatorProperties::default(),
        }
    }
}

impl Default for DiscoveryLocatorProperties {
    fn default() -> Self {
        Self {
            lower_case_service_id: default_true(),
            route_id_prefix: default_route_id_prefix(),
        }
    }
}

impl ClientServiceConfig {
    /// 設定ファイルと環境変数から読み込む
    pub fn load(file: Option<&Path>) -> CommonResult<Self> {
        let config: Self = load_layered(file, CLIENT_SERVICE_ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定値を検証
    pub fn validate(&self) -> CommonResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(CommonError::Validation(
                "database_url cannot be empty".to_string(),
            ));
        }
        validate_service_name(&self.service_name)?;
        if self.heartbeat_interval_secs == 0 {
            return Err(CommonError::Validation(
                "heartbeat_interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GatewayConfig {
    /// 設定ファイルと環境変数から読み込む
    pub fn load(file: Option<&Path>) -> CommonResult<Self> {
        let config: Self = load_layered(file, GATEWAY_ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定値を検証
    pub fn validate(&self) -> CommonResult<()> {
        if self.health_check_interval_secs == 0 {
            return Err(CommonError::Validation(
                "health_check_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.eviction_timeout_secs < self.instance_timeout_secs {
            return Err(CommonError::Validation(format!(
                "eviction_timeout_secs ({}) must not be shorter than instance_timeout_secs ({})",
                self.eviction_timeout_secs, self.instance_timeout_secs
            )));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(CommonError::Validation(
                "forwarding timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// ゲートウェイ自身のルートと衝突するサービス名（小文字化したパス先頭と比較する）
pub const RESERVED_SERVICE_NAMES: &[&str] = &["health", "registry"];

/// サービス名はルートのパスセグメントになるため、空や`/`を含む名前は拒否する
pub fn validate_service_name(name: &str) -> CommonResult<()> {
    if name.trim().is_empty() {
        return Err(CommonError::Validation(
            "service_name cannot be empty".to_string(),
        ));
    }
    if name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(CommonError::Validation(format!(
            "service_name must be a single path segment: {name}"
        )));
    }
    if RESERVED_SERVICE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        return Err(CommonError::Validation(format!(
            "service_name is reserved by the gateway: {name}"
        )));
    }
    Ok(())
}

fn load_layered<T: DeserializeOwned>(file: Option<&Path>, env_prefix: &str) -> CommonResult<T> {
    let mut builder = Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(File::from(path).required(true));
    }
    let settings = builder
        .add_source(
            Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
