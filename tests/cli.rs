//! End-to-end checks against the built binary

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const BIN: &str = env!("CARGO_BIN_EXE_wasm-preview-server");

fn write_site(dir: &Path, files: &[&str]) {
    for file in files {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"built").unwrap();
    }
}

fn run(base: &Path, extra: &[&str]) -> Output {
    Command::new(BIN)
        .arg("--base-dir")
        .arg(base)
        .args(["--host", "127.0.0.1"])
        .args(extra)
        .current_dir(base)
        .output()
        .unwrap()
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_no_build_directory_exits_1() {
    let base = tempfile::tempdir().unwrap();
    let output = run(base.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let text = combined(&output);
    assert!(text.contains("No built files found"), "{text}");
    assert!(text.contains("wasm-pack build"), "{text}");
}

#[test]
fn test_missing_wasm_is_listed() {
    let base = tempfile::tempdir().unwrap();
    write_site(
        &base.path().join("test-deploy"),
        &["index.html", "pkg/echoes_rpg.js"],
    );
    let output = run(base.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let text = combined(&output);
    assert!(text.contains("Missing required files"), "{text}");
    assert!(text.contains("- pkg/echoes_rpg_bg.wasm"), "{text}");
    assert!(!text.contains("- index.html"), "{text}");
}

#[test]
fn test_ports_exhausted_exits_1() {
    let base = tempfile::tempdir().unwrap();
    write_site(
        &base.path().join("dist"),
        &["index.html", "pkg/echoes_rpg.js", "pkg/echoes_rpg_bg.wasm"],
    );
    let blocker = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port().to_string();

    let output = run(base.path(), &["--port", &port, "--attempts", "1"]);

    assert_eq!(output.status.code(), Some(1));
    let text = combined(&output);
    assert!(text.contains("Serving from dist directory"), "{text}");
    assert!(
        text.contains(&format!("Could not find an available port starting from {port}")),
        "{text}"
    );
}

#[test]
fn test_serves_and_reports_next_port() {
    let base = tempfile::tempdir().unwrap();
    write_site(
        &base.path().join("test-deploy"),
        &["index.html", "pkg/echoes_rpg.js", "pkg/echoes_rpg_bg.wasm"],
    );
    let blocker = TcpListener::bind("127.0.0.1:0").unwrap();
    let taken = blocker.local_addr().unwrap().port();
    if TcpListener::bind(("127.0.0.1", taken + 1)).is_err() {
        // Neighbouring port owned by someone else; nothing meaningful to assert
        return;
    }

    let mut child = Command::new(BIN)
        .arg("--base-dir")
        .arg(base.path())
        .args(["--host", "127.0.0.1", "--port", &taken.to_string()])
        .current_dir(base.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let expected = format!("Server running at: http://localhost:{}", taken + 1);
    let mut banner_seen = false;
    while let Ok(line) = rx.recv_timeout(Duration::from_secs(10)) {
        if line.contains(&expected) {
            banner_seen = true;
            break;
        }
    }

    let response = banner_seen.then(|| {
        let mut stream = TcpStream::connect(("127.0.0.1", taken + 1)).unwrap();
        stream
            .write_all(
                b"GET /pkg/echoes_rpg_bg.wasm HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            )
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    });

    child.kill().unwrap();
    child.wait().unwrap();
    drop(blocker);

    assert!(banner_seen, "banner never reported port {}", taken + 1);
    let response = response.unwrap().to_ascii_lowercase();
    assert!(response.starts_with("http/1.1 200 ok"), "{response}");
    assert!(response.contains("content-type: application/wasm"), "{response}");
    assert!(response.contains("access-control-allow-origin: *"), "{response}");
}

#[test]
fn test_explicit_root_skips_detection() {
    let base = tempfile::tempdir().unwrap();
    let output = run(
        base.path(),
        &["--root", base.path().join("nowhere").to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(combined(&output).contains("No built files found"));
}

/// Start the server on an OS-assigned port and wait for its banner
#[cfg(unix)]
fn start_on_free_port(base: &Path) -> (std::process::Child, u16) {
    let mut child = Command::new(BIN)
        .arg("--base-dir")
        .arg(base)
        .args(["--host", "127.0.0.1", "--port", "0"])
        .current_dir(base)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();
    let port = loop {
        line.clear();
        assert_ne!(stdout.read_line(&mut line).unwrap(), 0, "server exited before the banner");
        if let Some(url) = line.trim().split("http://localhost:").nth(1) {
            break url.parse::<u16>().unwrap();
        }
    };
    child.stdout = Some(stdout.into_inner());
    (child, port)
}

#[cfg(unix)]
fn interrupt(child: &std::process::Child) {
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
}

#[cfg(unix)]
#[test]
fn test_sigint_stops_server_with_exit_0() {
    let base = tempfile::tempdir().unwrap();
    write_site(
        &base.path().join("test-deploy"),
        &["index.html", "pkg/echoes_rpg.js", "pkg/echoes_rpg_bg.wasm"],
    );
    let (child, port) = start_on_free_port(base.path());
    assert_ne!(port, 0);

    interrupt(&child);
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Server stopped by user"), "{stdout}");
}

#[cfg(unix)]
#[test]
fn test_rejected_method_logs_once() {
    let base = tempfile::tempdir().unwrap();
    write_site(
        &base.path().join("test-deploy"),
        &["index.html", "pkg/echoes_rpg.js", "pkg/echoes_rpg_bg.wasm"],
    );
    let (child, port) = start_on_free_port(base.path());

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream
        .write_all(b"POST /index.html HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    assert!(response.starts_with("HTTP/1.1 405"), "{response}");

    interrupt(&child);
    let output = child.wait_with_output().unwrap();
    let text = combined(&output);
    let access_lines = text
        .lines()
        .filter(|line| line.contains("POST /index.html"))
        .count();
    assert_eq!(access_lines, 1, "{text}");
    assert!(!text.contains("Method not allowed"), "{text}");
}
