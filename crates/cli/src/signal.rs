//! Ctrl-C / SIGTERM handling

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cancel `token` on the first Ctrl-C or SIGTERM
pub fn cancel_on_shutdown(token: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown requested, finishing current volume");
        token.cancel();
    });
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
