// Configuration module entry point
// Layers defaults, an optional config file, PREVIEW_* variables and CLI flags

mod state;
mod types;

use std::net::IpAddr;

use crate::cli::Args;
use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig};

/// Config file consulted when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "preview";

impl Config {
    /// Load configuration, command line flags taking precedence over everything else
    pub fn load(args: &Args) -> Result<Self, config::ConfigError> {
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE);
        let path_arg = |p: &Option<std::path::PathBuf>| p.as_ref().map(|p| p.display().to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(args.config.is_some()))
            .add_source(
                config::Environment::with_prefix("PREVIEW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.port_attempts", 10)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.shutdown_timeout", 5)?
            .set_default("site.candidates", vec!["test-deploy", "dist"])?
            .set_override_option("server.host", args.host.clone())?
            .set_override_option("server.port", args.port.map(i64::from))?
            .set_override_option("server.port_attempts", args.attempts.map(i64::from))?
            .set_override_option("site.base_dir", path_arg(&args.base_dir))?
            .set_override_option("site.root", path_arg(&args.root))?
            .build()?;

        settings.try_deserialize()
    }
}

impl ServerConfig {
    /// Parse the configured host, accepting `localhost` as loopback
    pub fn bind_ip(&self) -> Result<IpAddr, StartupError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(IpAddr::from([127, 0, 0, 1]));
        }
        self.host.parse().map_err(|e: std::net::AddrParseError| StartupError::Address {
            host: self.host.clone(),
            reason: e.to_string(),
        })
    }
}
