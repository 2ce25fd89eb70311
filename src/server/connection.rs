// Connection handling module
// Serves one accepted TCP connection per task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve a single connection in a tracked task.
///
/// When `shutdown` fires, the connection finishes the response in flight
/// and then closes instead of waiting for another keep-alive request.
pub fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    keep_alive: bool,
    tracker: &TaskTracker,
    shutdown: CancellationToken,
) {
    tracker.spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let service = service_fn(move |req| {
            handler::handle_request(req, Arc::clone(&state), peer_addr)
        });
        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        let result = tokio::select! {
            res = conn.as_mut() => res,
            () = shutdown.cancelled() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        };

        if let Err(err) = result {
            logger::log_connection_error(&err);
        }
    });
}
