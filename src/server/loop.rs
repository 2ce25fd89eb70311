// Server loop module
// Accepts connections until the shutdown token is cancelled

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::connection::handle_connection;
use crate::config::{AppState, PerformanceConfig};
use crate::logger;

/// Configuration for server loop behavior
#[derive(Debug, Clone, Copy)]
pub struct ServerLoopConfig {
    pub keep_alive: bool,
    /// Upper bound on waiting for in-flight connections after shutdown
    pub shutdown_timeout: Duration,
}

impl From<&PerformanceConfig> for ServerLoopConfig {
    fn from(performance: &PerformanceConfig) -> Self {
        Self {
            keep_alive: performance.keep_alive,
            shutdown_timeout: Duration::from_secs(performance.shutdown_timeout),
        }
    }
}

/// Accept loop
///
/// The token is checked between accepts. Once cancelled the listener is
/// closed, open connections are asked to wind down, and this returns when
/// they have finished or `shutdown_timeout` has elapsed.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    config: ServerLoopConfig,
    shutdown: CancellationToken,
) {
    let tracker = TaskTracker::new();

    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => break,

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(
                            stream,
                            peer_addr,
                            Arc::clone(&state),
                            config.keep_alive,
                            &tracker,
                            shutdown.clone(),
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }
        }
    }

    drop(listener);
    tracker.close();

    if !tracker.is_empty() {
        logger::log_draining(tracker.len());
        if tokio::time::timeout(config.shutdown_timeout, tracker.wait())
            .await
            .is_err()
        {
            logger::log_warning(&format!(
                "{} connection(s) still open after {}s, exiting anyway",
                tracker.len(),
                config.shutdown_timeout.as_secs()
            ));
        }
    }
}
