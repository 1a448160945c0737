// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Shared helpers for the workspace specs.

use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

/// Upper bound for `wait_for` polls; generous enough for a loaded CI box.
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Hard cap on any single CLI invocation.
const CLI_TIMEOUT: Duration = Duration::from_secs(30);

static BUILD_BINS: Once = Once::new();

/// Path to a workspace binary next to the test executable.
///
/// `cargo test --workspace` has already built the binaries by the time specs
/// run; a narrower invocation (`cargo test -p kz-specs`) has not, so build
/// them once on demand.
pub fn target_bin(name: &str) -> PathBuf {
    let path = bin_path(name);
    if !path.exists() {
        BUILD_BINS.call_once(|| {
            let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
            let status = std::process::Command::new(cargo)
                .args(["build", "--workspace", "--bins"])
                .current_dir(env!("CARGO_MANIFEST_DIR"))
                .status()
                .expect("run cargo build for workspace binaries");
            assert!(status.success(), "building workspace binaries failed");
        });
    }
    path
}

fn bin_path(name: &str) -> PathBuf {
    let mut dir = std::env::current_exe().expect("current test executable");
    dir.pop();
    if dir.ends_with("deps") {
        dir.pop();
    }
    dir.join(name)
}

pub fn kzd_binary() -> PathBuf {
    target_bin("kzd")
}

/// A `kz` invocation, unconfigured: callers add args and environment.
pub fn cli() -> Cli {
    Cli { cmd: assert_cmd::Command::new(target_bin("kz")) }
}

pub struct Cli {
    cmd: assert_cmd::Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit 0.
    pub fn passes(mut self) -> Spec {
        Spec::capture(self.cmd.timeout(CLI_TIMEOUT).assert().success())
    }

    /// Run and require a non-zero exit.
    pub fn fails(mut self) -> Spec {
        Spec::capture(self.cmd.timeout(CLI_TIMEOUT).assert().failure())
    }
}

/// Captured output of one CLI run, with fluent content assertions.
pub struct Spec {
    stdout: String,
    stderr: String,
}

impl Spec {
    fn capture(assert: assert_cmd::assert::Assert) -> Self {
        let output = assert.get_output();
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn stdout(&self) -> String {
        self.stdout.clone()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout missing {needle:?}\nstdout:\n{}\nstderr:\n{}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly contains {needle:?}\nstdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr missing {needle:?}\nstdout:\n{}\nstderr:\n{}",
            self.stdout,
            self.stderr
        );
        self
    }
}

/// An isolated state directory for one spec.
///
/// Every `kz` run goes through [`Project::kz`] so the daemon, database and
/// logs all live under a temp dir that vanishes with the spec. Dropping the
/// project stops any daemon the spec left running.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("create spec temp dir") }
    }

    /// The state directory handed to `kz`/`kzd`; the daemon creates it.
    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    /// Write `config.toml` so the next daemon start picks the settings up.
    pub fn config(&self, content: &str) {
        std::fs::create_dir_all(self.state_path()).expect("create state dir");
        std::fs::write(self.state_path().join("config.toml"), content)
            .expect("write config.toml");
    }

    /// A `kz` invocation bound to this project's state directory.
    pub fn kz(&self) -> Cli {
        cli().env("KZ_STATE_DIR", self.state_path())
    }

    /// Contents of the daemon log, empty if none was written yet.
    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("daemon.log")).unwrap_or_default()
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        // A daemon left running would outlive its own state directory.
        if self.state_path().join("daemon.pid").exists() {
            let _ = std::process::Command::new(target_bin("kz"))
                .args(["daemon", "stop"])
                .env("KZ_STATE_DIR", self.state_path())
                .output();
        }
    }
}

/// Poll `cond` every 50 ms until it holds or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// One request captured by [`StubProvider`].
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Minimal HTTP server standing in for the provider endpoints.
///
/// Routes are prefix-matched against the request path; unmatched paths
/// answer 404. Every request is recorded, matched or not, so specs can
/// assert on webhook deliveries and sampling frequency.
pub struct StubProvider {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    routes: Arc<Mutex<Vec<(String, String)>>>,
    shutdown: Arc<AtomicBool>,
}

impl StubProvider {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener address");
        let requests: Arc<Mutex<Vec<StubRequest>>> = Arc::default();
        let routes: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_requests = Arc::clone(&requests);
        let thread_routes = Arc::clone(&routes);
        let thread_shutdown = Arc::clone(&shutdown);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                if thread_shutdown.load(Ordering::Relaxed) {
                    break;
                }
                let Ok(mut stream) = stream else { continue };
                let Some(request) = read_request(&mut stream) else { continue };
                let body = thread_routes
                    .lock()
                    .expect("stub routes lock")
                    .iter()
                    .find(|(prefix, _)| request.path.starts_with(prefix.as_str()))
                    .map(|(_, body)| body.clone());
                thread_requests.lock().expect("stub requests lock").push(request);
                let response = match body {
                    Some(body) => format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    ),
                    None => {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string()
                    }
                };
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { addr, requests, routes, shutdown }
    }

    /// Serve `body` with a 200 for any path starting with `prefix`.
    pub fn route(&self, prefix: &str, body: &str) {
        self.routes
            .lock()
            .expect("stub routes lock")
            .push((prefix.to_string(), body.to_string()));
    }

    /// Absolute URL for `path` on this stub.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// All requests seen so far, in arrival order.
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().expect("stub requests lock").clone()
    }

    /// Requests whose path starts with `prefix`.
    pub fn hits(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .expect("stub requests lock")
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }
}

impl Drop for StubProvider {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Unblock the accept loop so the thread observes the flag.
        let _ = TcpStream::connect(self.addr);
    }
}

/// Parse one HTTP request off the wire: request line, headers, then a body
/// of exactly Content-Length bytes.
fn read_request(stream: &mut TcpStream) -> Option<StubRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break end + 4;
        }
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some(StubRequest { method, path, body: String::from_utf8_lossy(&body).into_owned() })
}
