//! Process shutdown: signal handling and store teardown.
//!
//! Any command that opens the store runs under `run_until_signal`, so the
//! pool is released whether the command finishes, fails, or is interrupted.

use std::future::Future;

use tracing::{error, info};

use crate::state::AppState;

/// Wait for Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// source simply never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Release the store's pooled connections. Safe to call more than once.
pub async fn close_store(state: &AppState) {
    state.store().close().await;
}

/// Drive `work` to completion or until `signal` resolves, then close the store.
///
/// An interrupted command is a clean exit: the result is `Ok(())`.
pub async fn run_until_signal<W, S>(state: &AppState, work: W, signal: S) -> anyhow::Result<()>
where
    W: Future<Output = anyhow::Result<()>>,
    S: Future<Output = ()>,
{
    let result = tokio::select! {
        result = work => result,
        () = signal => {
            info!("interrupted, closing chat log store");
            Ok(())
        }
    };
    close_store(state).await;
    result
}
