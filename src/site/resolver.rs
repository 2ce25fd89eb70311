//! Directory resolver
//!
//! Picks the directory whose contents are served for the whole process
//! lifetime. The process working directory is never changed; the chosen
//! root is handed to the request handler instead.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::StartupError;
use crate::logger;

/// Canonical, absolute directory files are served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeRoot {
    path: PathBuf,
}

impl ServeRoot {
    /// Canonicalize `path`, which must be an existing directory
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().canonicalize()?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", path.display()),
            ));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Join a relative path onto the root
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path.join(relative)
    }

    /// Whether an already canonicalized path lies inside the root
    pub fn contains(&self, canonical: &Path) -> bool {
        canonical.starts_with(&self.path)
    }
}

/// Directory holding the running executable
pub fn executable_dir() -> Result<PathBuf, StartupError> {
    let exe = std::env::current_exe().map_err(StartupError::BaseDir)?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        StartupError::BaseDir(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        ))
    })
}

/// Choose the serve root from site configuration
///
/// An explicit `root` wins. Otherwise the first candidate that exists as a
/// directory under `base_dir` is used.
pub fn resolve_serve_root(site: &SiteConfig, base_dir: &Path) -> Result<ServeRoot, StartupError> {
    if let Some(root) = &site.root {
        let root = if root.is_absolute() {
            root.clone()
        } else {
            base_dir.join(root)
        };
        return match ServeRoot::new(&root) {
            Ok(serve_root) => {
                logger::log_serving_from(&root.display().to_string());
                Ok(serve_root)
            }
            Err(_) => Err(StartupError::Configuration {
                base_dir: root,
                candidates: Vec::new(),
            }),
        };
    }

    for candidate in &site.candidates {
        let dir = base_dir.join(candidate);
        if !dir.is_dir() {
            continue;
        }
        if let Ok(serve_root) = ServeRoot::new(&dir) {
            logger::log_serving_from(candidate);
            return Ok(serve_root);
        }
    }

    Err(StartupError::Configuration {
        base_dir: base_dir.to_path_buf(),
        candidates: site.candidates.clone(),
    })
}
