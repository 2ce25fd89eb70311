//! Artifact validator
//!
//! Confirms the build output is complete before the server starts.

use crate::error::StartupError;
use crate::site::ServeRoot;

/// Files that must exist under the serve root, relative to it
pub const REQUIRED_FILES: [&str; 3] = ["index.html", "pkg/echoes_rpg.js", "pkg/echoes_rpg_bg.wasm"];

/// Required entries absent from `root`, in the order given
pub fn find_missing<S: AsRef<str>>(root: &ServeRoot, required: &[S]) -> Vec<String> {
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|file| !root.join(file).exists())
        .map(ToString::to_string)
        .collect()
}

/// Fail with every missing artifact listed
pub fn validate_artifacts<S: AsRef<str>>(
    root: &ServeRoot,
    required: &[S],
) -> Result<(), StartupError> {
    let missing = find_missing(root, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StartupError::MissingArtifacts {
            root: root.path().to_path_buf(),
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_site(dir: &Path, files: &[&str]) {
        for file in files {
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, b"x").unwrap();
        }
    }

    #[test]
    fn test_complete_site_passes() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path(), &REQUIRED_FILES);
        let root = ServeRoot::new(dir.path()).unwrap();

        assert!(find_missing(&root, &REQUIRED_FILES).is_empty());
        assert!(validate_artifacts(&root, &REQUIRED_FILES).is_ok());
    }

    #[test]
    fn test_missing_wasm_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path(), &["index.html", "pkg/echoes_rpg.js"]);
        let root = ServeRoot::new(dir.path()).unwrap();

        match validate_artifacts(&root, &REQUIRED_FILES) {
            Err(StartupError::MissingArtifacts { missing, .. }) => {
                assert_eq!(missing, vec!["pkg/echoes_rpg_bg.wasm"]);
            }
            other => panic!("expected missing artifacts, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = ServeRoot::new(dir.path()).unwrap();
        assert_eq!(find_missing(&root, &REQUIRED_FILES), REQUIRED_FILES.to_vec());
    }
}
