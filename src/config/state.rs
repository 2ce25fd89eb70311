// Application state module
// Read-only values shared by every connection for the process lifetime

use super::types::Config;
use crate::site::ServeRoot;

/// Application state
pub struct AppState {
    pub root: ServeRoot,
    pub index_files: Vec<String>,
    pub access_log: bool,
    pub access_log_format: String,
}

impl AppState {
    pub fn new(config: &Config, root: ServeRoot) -> Self {
        Self {
            root,
            index_files: config.site.index_files.clone(),
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        }
    }
}
