//! Serve root detection and artifact validation
//!
//! Both run once at startup, before any port is bound.

pub mod artifacts;
pub mod resolver;

pub use artifacts::{validate_artifacts, REQUIRED_FILES};
pub use resolver::{executable_dir, resolve_serve_root, ServeRoot};
