//! Shared test utilities for winium integration tests.
//!
//! Provides:
//! - [`FakeDriverServer`]: an in-process HTTP endpoint that answers like a
//!   Winium driver and records every request it receives.
//! - [`write_fake_driver`] and friends: tiny shell scripts standing in for
//!   driver executables, so service lifecycle tests can spawn real children.
//! - [`init_tracing`]: a `tracing-subscriber` setup for test output.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::Json;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Session id handed out by [`FakeDriverServer`] on `POST /session`.
pub const FAKE_SESSION_ID: &str = "fake-session";

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Fake driver endpoint
// ---------------------------------------------------------------------------

/// A request captured by [`FakeDriverServer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Parsed JSON body, or `Value::Null` when the body was empty.
    pub body: Value,
}

#[derive(Default)]
struct FakeState {
    requests: Mutex<Vec<RecordedRequest>>,
    /// Overrides keyed by `(METHOD, path)`: HTTP status and full JSON body.
    responses: Mutex<HashMap<(String, String), (u16, Value)>>,
}

/// In-process fake of a Winium driver's HTTP surface.
///
/// Defaults:
/// - `GET /status` answers with a build description.
/// - `POST /session` creates [`FAKE_SESSION_ID`] and echoes the desired
///   capabilities back as the session value.
/// - every other request succeeds with a `null` value.
///
/// Individual routes can be overridden with [`FakeDriverServer::respond`] or
/// [`FakeDriverServer::respond_raw`]. The server stops when dropped.
pub struct FakeDriverServer {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeDriverServer {
    /// Start on a random loopback port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake driver server to loopback");
        Self::start_on(listener)
    }

    /// Start serving on an already-bound listener.
    pub fn start_on(listener: TcpListener) -> Self {
        let addr = listener
            .local_addr()
            .expect("failed to read fake driver server address");
        let state = Arc::new(FakeState::default());
        let router = Router::new()
            .fallback(handle_request)
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::warn!(error = %e, "fake driver server stopped");
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:12345/`.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Answer `method path` with a JSON-wire success carrying `value`.
    pub fn respond(&self, method: &str, path: &str, value: Value) {
        self.respond_raw(
            method,
            path,
            200,
            json!({ "sessionId": FAKE_SESSION_ID, "status": 0, "value": value }),
        );
    }

    /// Answer `method path` with an arbitrary HTTP status and body.
    pub fn respond_raw(&self, method: &str, path: &str, http_status: u16, body: Value) {
        self.state
            .responses
            .lock()
            .expect("fake driver state poisoned")
            .insert((method.to_uppercase(), path.to_string()), (http_status, body));
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("fake driver state poisoned")
            .clone()
    }

    /// Requests whose path equals `path`.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for FakeDriverServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_request(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    let path = uri.path().to_string();
    tracing::debug!(%method, path = %path, "fake driver received request");

    state
        .requests
        .lock()
        .expect("fake driver state poisoned")
        .push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            body: body.clone(),
        });

    let key = (method.to_string(), path.clone());
    if let Some((status, response)) = state
        .responses
        .lock()
        .expect("fake driver state poisoned")
        .get(&key)
        .cloned()
    {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(response));
    }

    let response = match (method.as_str(), path.as_str()) {
        ("GET", "/status") => json!({
            "status": 0,
            "value": { "build": { "version": "fake" } },
        }),
        ("POST", "/session") => json!({
            "sessionId": FAKE_SESSION_ID,
            "status": 0,
            "value": body.get("desiredCapabilities").cloned().unwrap_or(Value::Null),
        }),
        _ => json!({ "sessionId": FAKE_SESSION_ID, "status": 0, "value": null }),
    };
    (StatusCode::OK, Json(response))
}

// ---------------------------------------------------------------------------
// Fake driver executables
// ---------------------------------------------------------------------------

/// Script that records its arguments to `args_file` and then sleeps, like a
/// driver that never answers on its own.
pub fn recording_driver_script(args_file: &Path) -> String {
    let target = args_file.to_string_lossy().replace('\'', "'\\''");
    format!("#!/bin/sh\necho \"$@\" > '{target}'\nexec sleep 30\n")
}

/// Script that exits immediately with a failure status.
pub const EXITING_DRIVER_SCRIPT: &str = "#!/bin/sh\nexit 3\n";

/// Write an executable script named `file_name` into `dir`.
pub fn write_fake_driver(dir: &Path, file_name: &str, script: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    std::fs::write(&path, script)
        .with_context(|| format!("failed to write fake driver at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to mark {} executable", path.display()))?;
    }

    Ok(path)
}

/// A temporary directory holding one fake driver executable.
pub fn fake_driver_dir(file_name: &str, script: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("failed to create temp dir for fake driver")?;
    let path = write_fake_driver(dir.path(), file_name, script)?;
    Ok((dir, path))
}

/// Read the arguments captured by [`recording_driver_script`], waiting
/// briefly for the child to write them.
pub async fn read_recorded_args(args_file: &Path) -> Result<String> {
    for _ in 0..50 {
        if let Ok(contents) = tokio::fs::read_to_string(args_file).await {
            if !contents.is_empty() {
                return Ok(contents.trim_end().to_string());
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    anyhow::bail!("fake driver never wrote {}", args_file.display())
}
