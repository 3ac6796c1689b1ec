//! ロギング初期化ユーティリティ
//!
//! 標準出力への fmt レイヤーに加え、`log_dir` が指定された場合は
//! `tracing-appender` による日次ローテーションのファイル出力を行う。

use crate::error::{CommonError, CommonResult};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ファイル出力ワーカーのガード
///
/// ドロップするとバッファがフラッシュされ書き込みが止まるため、プロセス終了まで保持すること。
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// グローバルsubscriberを初期化する
///
/// `RUST_LOG` が設定されていればそれを優先し、なければ `level` を使う。
pub fn init(app_name: &str, level: &str, log_dir: Option<&Path>) -> CommonResult<LoggingGuard> {
    let filter = build_filter(level)?;

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                CommonError::Config(format!(
                    "Failed to create log directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| CommonError::Config(format!("Failed to initialize logging: {e}")))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_filter(level: &str) -> CommonResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| CommonError::Config(format!("Invalid log level '{level}': {e}")))
}
