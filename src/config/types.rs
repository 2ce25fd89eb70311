// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// First port tried by the port binder
    pub port: u16,
    /// How many consecutive ports are tried, starting at `port`
    pub port_attempts: u16,
    pub workers: Option<usize>,
}

/// Where the built artifacts live and what must be present
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Directory searched for candidates (executable directory if unset)
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    /// Explicit serve root, skips candidate detection
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
    #[serde(default = "default_required_files")]
    pub required_files: Vec<String>,
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (common, combined or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds to wait for in-flight connections after an interrupt
    pub shutdown_timeout: u64,
}

fn default_candidates() -> Vec<String> {
    vec!["test-deploy".to_string(), "dist".to_string()]
}

fn default_required_files() -> Vec<String> {
    crate::site::REQUIRED_FILES
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            root: None,
            candidates: default_candidates(),
            required_files: default_required_files(),
            index_files: default_index_files(),
        }
    }
}
