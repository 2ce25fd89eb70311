//! Error types
//!
//! Startup errors are fatal and end the process with exit code 1.
//! Serve errors are per-request and only ever become a status code.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Build command suggested whenever the served artifacts are absent
pub const BUILD_HINT: &str = "wasm-pack build --target web --out-dir pkg --no-typescript";

/// Fatal errors raised before the server starts accepting connections
#[derive(Debug, Error)]
pub enum StartupError {
    /// No candidate serve directory exists under the base directory
    #[error("No built files found in {}", base_dir.display())]
    Configuration {
        base_dir: PathBuf,
        candidates: Vec<String>,
    },

    /// The serve directory lacks one or more required artifacts
    #[error("Missing required files:")]
    MissingArtifacts { root: PathBuf, missing: Vec<String> },

    /// Binding failed for a reason other than the address being taken
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Every candidate port was already in use
    #[error("Could not find an available port starting from {start}")]
    PortExhaustion { start: u16, attempts: u16 },

    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid bind address '{host}': {reason}")]
    Address { host: String, reason: String },

    #[error("Failed to open log files: {0}")]
    Logger(#[source] io::Error),

    #[error("Failed to locate the executable directory: {0}")]
    BaseDir(#[source] io::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}

impl StartupError {
    /// Detail and remediation lines printed under the error headline
    pub fn remediation(&self) -> Vec<String> {
        match self {
            Self::Configuration { candidates, .. } => {
                let target = if candidates.is_empty() {
                    "a deployment directory".to_string()
                } else {
                    format!("a deployment directory ({})", candidates.join(" or "))
                };
                vec![
                    format!("   Please run '{BUILD_HINT}' first"),
                    format!("   Then create {target} with index.html and pkg/"),
                ]
            }
            Self::MissingArtifacts { root, missing } => {
                let mut lines: Vec<String> =
                    missing.iter().map(|file| format!("   - {file}")).collect();
                lines.push(String::new());
                lines.push(format!("   Looked in: {}", root.display()));
                lines.push("   Please ensure you have built the WASM package correctly.".to_string());
                lines
            }
            Self::Bind { .. } => vec![
                "   Check that you are allowed to listen on this address and port".to_string(),
            ],
            Self::PortExhaustion { start, attempts } => vec![format!(
                "   Ports {start}-{} are all in use; free one or pass --port",
                start.saturating_add(attempts.saturating_sub(1))
            )],
            Self::Config(_) | Self::Address { .. } => {
                vec!["   Check preview.toml, PREVIEW_* variables and command line flags".to_string()]
            }
            Self::Logger(_) | Self::BaseDir(_) | Self::Runtime(_) => Vec::new(),
        }
    }
}

/// Recoverable per-request failures
#[derive(Debug, Error)]
pub enum ServeError {
    /// Nothing servable at this path inside the serve root
    #[error("not found")]
    NotFound,

    /// The file exists but could not be opened or read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServeError {
    /// Classify an I/O error raised while opening `path`
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            _ => Self::Read { path, source },
        }
    }
}
