//! Static file serving module
//!
//! Maps request paths onto files inside the serve root and opens them.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};

use crate::config::AppState;
use crate::error::ServeError;
use crate::http::{self, mime, ResponseBody};
use crate::logger;
use crate::site::ServeRoot;
use hyper::Response;

/// Bytes escaped when a path segment is written back into a `Location`
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Outcome of mapping a request path onto the serve root
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    /// A regular file; `path` is what was asked for, `canonical` what gets opened
    File { path: PathBuf, canonical: PathBuf },
    /// A directory requested without its trailing slash
    Redirect(String),
}

/// Serve a GET or HEAD request for `path` (query string excluded)
pub async fn serve_path(
    state: &AppState,
    path: &str,
    query: Option<&str>,
    is_head: bool,
) -> Response<ResponseBody> {
    let resolved = match resolve_path(&state.root, path, query, &state.index_files).await {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e, is_head),
    };

    match resolved {
        Resolved::Redirect(target) => http::build_redirect_response(&target),
        Resolved::File { path, canonical } => match open_file(&canonical).await {
            Ok((file, len)) => {
                http::build_file_response(file, len, mime::content_type_for(&path), is_head)
            }
            Err(e) => error_response(&e, is_head),
        },
    }
}

/// Decode a URL path into a relative path with no way out of the root
///
/// Empty, `.` and `..` segments are dropped. Returns `None` for paths that
/// are not valid UTF-8 once decoded or that contain segments which are not
/// plain file names on this platform.
pub fn sanitize_path(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let mut relative = PathBuf::new();

    for segment in decoded.split('/') {
        if matches!(segment, "" | "." | "..") {
            continue;
        }
        if segment.contains('\0') {
            return None;
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => relative.push(segment),
            _ => return None,
        }
    }

    Some(relative)
}

/// Resolve a request path to a file inside `root`
pub async fn resolve_path(
    root: &ServeRoot,
    request_path: &str,
    query: Option<&str>,
    index_files: &[String],
) -> Result<Resolved, ServeError> {
    let relative = sanitize_path(request_path).ok_or(ServeError::NotFound)?;
    let mut path = root.join(&relative);

    let metadata = fs::metadata(&path)
        .await
        .map_err(|e| ServeError::from_io(path.clone(), e))?;

    if metadata.is_dir() {
        if !request_path.ends_with('/') {
            return Ok(Resolved::Redirect(redirect_target(&relative, query)));
        }
        path = find_index_file(&path, index_files)
            .await
            .ok_or(ServeError::NotFound)?;
    }

    let canonical = fs::canonicalize(&path)
        .await
        .map_err(|e| ServeError::from_io(path.clone(), e))?;

    if !root.contains(&canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            canonical.display()
        ));
        return Err(ServeError::NotFound);
    }

    Ok(Resolved::File { path, canonical })
}

/// Absolute, single-slash location for a directory inside the root
///
/// Built from the sanitized path so a request like `//host` can never turn
/// into a protocol-relative redirect.
fn redirect_target(relative: &Path, query: Option<&str>) -> String {
    let mut target = String::from("/");
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            target.extend(utf8_percent_encode(&segment.to_string_lossy(), SEGMENT));
            target.push('/');
        }
    }
    if let Some(q) = query {
        target.push('?');
        target.push_str(q);
    }
    target
}

/// First index file present in `dir`
async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for index_file in index_files {
        let candidate = dir.join(index_file);
        if let Ok(metadata) = fs::metadata(&candidate).await {
            if metadata.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Open a file for streaming, returning it with its length
pub async fn open_file(path: &Path) -> Result<(File, u64), ServeError> {
    let file = File::open(path)
        .await
        .map_err(|e| ServeError::from_io(path.to_path_buf(), e))?;
    let metadata = file
        .metadata()
        .await
        .map_err(|e| ServeError::from_io(path.to_path_buf(), e))?;
    Ok((file, metadata.len()))
}

fn error_response(err: &ServeError, is_head: bool) -> Response<ResponseBody> {
    match err {
        ServeError::NotFound => http::build_404_response(is_head),
        ServeError::Read { .. } => {
            logger::log_error(&err.to_string());
            http::build_500_response(is_head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;

    fn index_files() -> Vec<String> {
        vec!["index.html".to_string()]
    }

    fn site() -> (tempfile::TempDir, ServeRoot) {
        let dir = tempfile::tempdir().unwrap();
        std_fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std_fs::write(dir.path().join("index.html"), b"<html></html>").unwrap();
        std_fs::write(dir.path().join("pkg/echoes_rpg.js"), b"export {}").unwrap();
        let root = ServeRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_sanitize_drops_parent_segments() {
        assert_eq!(
            sanitize_path("/../../etc/passwd"),
            Some(PathBuf::from("etc/passwd"))
        );
        assert_eq!(
            sanitize_path("/pkg/./echoes_rpg.js"),
            Some(PathBuf::from("pkg/echoes_rpg.js"))
        );
        assert_eq!(sanitize_path("/%2e%2e/secret"), Some(PathBuf::from("secret")));
        assert_eq!(sanitize_path("/"), Some(PathBuf::new()));
    }

    #[test]
    fn test_sanitize_decodes_and_rejects() {
        assert_eq!(
            sanitize_path("/assets/my%20map.json"),
            Some(PathBuf::from("assets/my map.json"))
        );
        assert_eq!(sanitize_path("/bad%00name"), None);
        assert_eq!(sanitize_path("/%ff%fe"), None);
    }

    #[tokio::test]
    async fn test_resolve_file() {
        let (_dir, root) = site();
        let resolved = resolve_path(&root, "/pkg/echoes_rpg.js", None, &index_files())
            .await
            .unwrap();
        match resolved {
            Resolved::File { path, canonical } => {
                assert!(path.ends_with("pkg/echoes_rpg.js"));
                assert!(root.contains(&canonical));
            }
            Resolved::Redirect(target) => panic!("unexpected redirect to {target}"),
        }
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let (_dir, root) = site();
        let resolved = resolve_path(&root, "/", None, &index_files()).await.unwrap();
        assert!(matches!(resolved, Resolved::File { ref path, .. } if path.ends_with("index.html")));
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let (_dir, root) = site();
        let resolved = resolve_path(&root, "/pkg", Some("v=2"), &index_files())
            .await
            .unwrap();
        assert_eq!(resolved, Resolved::Redirect("/pkg/?v=2".to_string()));
    }

    #[tokio::test]
    async fn test_redirect_cannot_leave_host() {
        let (dir, root) = site();
        std_fs::create_dir_all(dir.path().join("evil.com")).unwrap();
        std_fs::create_dir_all(dir.path().join("my maps")).unwrap();

        for (request, expected) in [
            ("//evil.com", "/evil.com/"),
            ("///evil.com", "/evil.com/"),
            ("/./evil.com", "/evil.com/"),
            ("/my%20maps", "/my%20maps/"),
        ] {
            let resolved = resolve_path(&root, request, None, &index_files())
                .await
                .unwrap();
            assert_eq!(resolved, Resolved::Redirect(expected.to_string()), "{request}");
        }
    }

    #[tokio::test]
    async fn test_directory_without_index_is_not_found() {
        let (_dir, root) = site();
        let result = resolve_path(&root, "/pkg/", None, &index_files()).await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_traversal_stays_inside_root() {
        let (_dir, root) = site();
        let result = resolve_path(&root, "/../../etc/passwd", None, &index_files()).await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_blocked() {
        let (dir, root) = site();
        let outside = tempfile::tempdir().unwrap();
        std_fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("leak.txt"),
        )
        .unwrap();

        let result = resolve_path(&root, "/leak.txt", None, &index_files()).await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_open_file_reports_length() {
        let (dir, _root) = site();
        let (_file, len) = open_file(&dir.path().join("pkg/echoes_rpg.js")).await.unwrap();
        assert_eq!(len, 9);

        let missing = open_file(&dir.path().join("nope.js")).await;
        assert!(matches!(missing, Err(ServeError::NotFound)));
    }
}
