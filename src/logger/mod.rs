//! Logger module
//!
//! Provides logging utilities for the preview server:
//! - Startup status lines and the banner
//! - Startup failure diagnostics
//! - Per-request access logging
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::LoggingConfig;
use crate::error::StartupError;
use std::path::Path;

const RULE: &str = "==================================================";

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_serving_from(dir: &str) {
    write_info(&format!("📁 Serving from {dir} directory"));
}

/// Print a fatal startup error with its remediation hints
pub fn log_startup_failure(err: &StartupError) {
    write_error(&format!("❌ Error: {err}"));
    for line in err.remediation() {
        write_error(&line);
    }
}

pub fn log_port_in_use(port: u16) {
    log_warning(&format!("Port {port} is already in use, trying the next one"));
}

/// Startup banner printed once the port is bound
pub fn log_server_start(port: u16, root: &Path) {
    let url = format!("http://localhost:{port}");
    write_info("🎮 Echoes RPG Test Server");
    write_info(RULE);
    write_info(&format!("🌐 Server running at: {url}"));
    write_info(&format!("📂 Serving files from: {}", root.display()));
    write_info("🔧 WASM and CORS headers configured");
    write_info(RULE);
    write_info(&format!("🎯 Open {url} in your browser to play!"));
    write_info("⏹️  Press Ctrl+C to stop the server");
    write_info("");
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("\n[SIGNAL] {signal} received, shutting down..."));
}

pub fn log_draining(active: usize) {
    write_info(&format!(
        "[SHUTDOWN] Waiting for {active} in-flight connection(s) to finish"
    ));
}

pub fn log_server_stopped() {
    write_info("🛑 Server stopped by user");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
