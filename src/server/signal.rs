// Signal handling module
//
// Supported signals:
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGTERM: Graceful shutdown (Unix only)

use tokio_util::sync::CancellationToken;

use crate::logger;

/// Cancel `shutdown` on the first interrupt or terminate signal
///
/// On Unix the handlers are registered before this returns, so a signal
/// sent right after the startup banner is never lost. Must be called inside
/// the runtime.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| logger::log_warning(&format!("Failed to register SIGINT handler: {e}")))
        .ok();
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| logger::log_warning(&format!("Failed to register SIGTERM handler: {e}")))
        .ok();

    tokio::spawn(async move {
        let name = tokio::select! {
            Some(()) = recv(sigint.as_mut()) => "SIGINT",
            Some(()) = recv(sigterm.as_mut()) => "SIGTERM",
            else => return,
        };
        logger::log_shutdown_requested(name);
        shutdown.cancel();
    });
}

/// Next delivery of `signal`; pends forever when it was never registered
#[cfg(unix)]
async fn recv(signal: Option<&mut tokio::signal::unix::Signal>) -> Option<()> {
    match signal {
        Some(signal) => signal.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_warning(&format!("Failed to register Ctrl+C handler: {e}"));
            return std::future::pending().await;
        }
        logger::log_shutdown_requested("SIGINT");
        shutdown.cancel();
    });
}
