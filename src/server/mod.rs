// Server module entry point
// Port binding, the accept loop, connection handling and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword), so it is server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used types
pub use listener::PortBinder;
pub use server_loop::{start_server_loop, ServerLoopConfig};
pub use signal::start_signal_handler;
