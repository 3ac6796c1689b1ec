//! シャットダウン制御
//!
//! サーバー本体とバックグラウンドタスク（ヘルスモニター、ハートビートループ）が
//! 同じコントローラを共有し、OSシグナルまたは明示的な要求で一斉に停止する。

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// 停止理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// プロセス内からの要求（テスト、サーバーのエラー終了など）
    Requested,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "Ctrl+C"),
            Self::Terminate => write!(f, "SIGTERM"),
            Self::Requested => write!(f, "shutdown request"),
        }
    }
}

/// 協調シャットダウン用のコントローラ
///
/// 最初に記録された停止理由だけが残る。
#[derive(Clone, Debug)]
pub struct ShutdownController {
    state: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
        }
    }
}

impl ShutdownController {
    /// 停止が要求済みか
    pub fn is_shutdown_requested(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// 記録された停止理由
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.state.borrow()
    }

    /// プロセス内から停止を要求する
    pub fn request_shutdown(&self) {
        self.trigger(ShutdownReason::Requested);
    }

    /// 理由付きで停止を要求し、待機中のタスクをすべて起こす
    pub fn trigger(&self, reason: ShutdownReason) {
        self.state.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }

    /// 停止が要求されるまで待機する（要求済みなら即座に戻る）
    pub async fn wait(&self) {
        let mut rx = self.state.subscribe();
        // 送信側は自身が保持しているため、チャネルが閉じることはない
        let _ = rx.wait_for(Option::is_some).await;
    }
}

/// OSシグナルまたはコントローラからの要求を待機し、コントローラに伝播する
pub async fn shutdown_signal(shutdown: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => shutdown.trigger(ShutdownReason::Interrupt),
        _ = terminate => shutdown.trigger(ShutdownReason::Terminate),
        _ = shutdown.wait() => {}
    }

    let reason = shutdown.reason().unwrap_or(ShutdownReason::Requested);
    info!(reason = %reason, "Shutting down");
}
