//! Stdio JSON-RPC proxy.
//!
//! `StdioProxy` owns one subprocess speaking newline-delimited JSON-RPC 2.0 on
//! its standard streams and exposes a single awaitable `call`.
//!
//! # Architecture
//!
//! ```text
//! call() ──► ServerProcess (stdin lock: id + register + write, one deadline)
//!              │
//!              ├── Reader task ──► ResponseRouter ──► oneshot waiter
//!              └── Stderr task ──► log
//! ```
//!
//! Every outcome other than a spawn failure is a JSON-RPC shaped object:
//! the server's own response, or a synthetic error response for timeouts
//! (-32001) and transport failures (-32002).

pub(crate) mod actor;
mod process;
pub mod protocol;
mod session;
mod stdout_log;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::time::{Instant, timeout_at};

use crate::config::ProxyConfig;
use crate::error::ProxyResult;
use crate::logging::{preview, preview_str};
use actor::PendingGuard;
use process::ServerProcess;
use protocol::{
    HANDSHAKE_METHOD, JsonRpcRequest, RequestId, ResponseError, advertised_tool_count,
    build_initialize_params, handshake_succeeded,
};
use session::SessionState;
use stdout_log::StdoutLog;

const TARGET: &str = "github_mcp_wrapper::proxy";

/// Reason handed to waiters when a write to stdin misses its deadline.
const WRITE_STALLED: &str = "subprocess stopped reading requests";

/// Proxy for one stdio JSON-RPC subprocess.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct StdioProxy {
    config: ProxyConfig,
    process: std::sync::Mutex<Option<Arc<ServerProcess>>>,
    /// Correlation ids, monotonic for the lifetime of the proxy.
    next_id: AtomicI64,
    handshakes: AtomicU64,
    stdout_log: Arc<StdoutLog>,
}

impl StdioProxy {
    pub fn new(config: ProxyConfig) -> Self {
        let stdout_log = Arc::new(StdoutLog::new(config.stdout_history));
        Self {
            config,
            process: std::sync::Mutex::new(None),
            next_id: AtomicI64::new(1),
            handshakes: AtomicU64::new(0),
            stdout_log,
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Spawn the subprocess unless one is already running.
    ///
    /// A subprocess that has died is not replaced; only `shutdown` clears it.
    pub fn start(&self) -> ProxyResult<()> {
        self.ensure_started().map(|_| ())
    }

    fn ensure_started(&self) -> ProxyResult<Arc<ServerProcess>> {
        let mut slot = self.process.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(process) = slot.as_ref() {
            return Ok(Arc::clone(process));
        }

        let process = Arc::new(ServerProcess::spawn(
            &self.config,
            Arc::clone(&self.stdout_log),
        )?);
        *slot = Some(Arc::clone(&process));
        Ok(process)
    }

    fn current(&self) -> Option<Arc<ServerProcess>> {
        self.process
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Send `method` and wait up to `timeout` for its response.
    ///
    /// Starts the subprocess and performs the session handshake on first use.
    /// Calling the handshake method explicitly forces a fresh handshake with
    /// the caller's params. A missing `params` is sent as `{}`.
    ///
    /// # Returns
    /// * `Ok(response)` - The server's response unmodified, or a synthetic
    ///   error response (-32001 timeout, -32002 transport failure)
    /// * `Err(ProxyError::ProcessSpawn)` - The subprocess could not be started
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> ProxyResult<Value> {
        let deadline = deadline_after(timeout);
        let process = self.ensure_started()?;
        let params = params.unwrap_or_else(|| Value::Object(Default::default()));

        if method == HANDSHAKE_METHOD {
            let Ok(mut session) = timeout_at(deadline, process.session()).await else {
                return Ok(self.timed_out(method, None));
            };
            session.reset();
            let response = self.send_request(&process, method, &params, deadline).await;
            self.record_handshake(&mut session, &response);
            return Ok(response);
        }

        {
            let Ok(mut session) = timeout_at(deadline, process.session()).await else {
                return Ok(self.timed_out(method, None));
            };
            if !session.is_initialized() {
                let handshake_deadline =
                    deadline.min(deadline_after(self.config.handshake_timeout));
                self.handshake(&process, &mut session, handshake_deadline)
                    .await;
            }
        }

        Ok(self.send_request(&process, method, &params, deadline).await)
    }

    /// Tear down the subprocess, failing anything still pending.
    ///
    /// The next `call` spawns a fresh subprocess with a fresh session.
    pub async fn shutdown(&self) {
        let process = self
            .process
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(process) = process {
            debug!(target: TARGET, "Shutting down subprocess");
            process.shutdown(self.config.shutdown_grace).await;
        }
    }

    /// The last `n` raw stdout lines, oldest first.
    pub fn recent_stdout(&self, n: usize) -> Vec<String> {
        self.stdout_log.recent(n)
    }

    /// Whether a subprocess handle exists (it may have exited since).
    pub fn is_started(&self) -> bool {
        self.current().is_some()
    }

    /// Whether the current subprocess completed a handshake.
    ///
    /// Waits for an in-flight handshake to finish.
    pub async fn is_initialized(&self) -> bool {
        match self.current() {
            Some(process) => process.session().await.is_initialized(),
            None => false,
        }
    }

    /// The response of the last successful handshake of the current subprocess.
    pub async fn init_response(&self) -> Option<Value> {
        let process = self.current()?;
        let session = process.session().await;
        session.init_response().cloned()
    }

    /// Number of requests waiting for a response.
    pub fn pending_requests(&self) -> usize {
        self.current()
            .map_or(0, |process| process.router().pending_count())
    }

    /// Number of handshakes attempted so far, automatic or explicit.
    pub fn handshake_count(&self) -> u64 {
        self.handshakes.load(Ordering::Relaxed)
    }

    async fn handshake(
        &self,
        process: &ServerProcess,
        session: &mut SessionState,
        deadline: Instant,
    ) {
        let params = build_initialize_params(
            &self.config.protocol_version,
            &self.config.client_name,
            &self.config.client_version,
        );
        let response = self
            .send_request(process, HANDSHAKE_METHOD, &params, deadline)
            .await;
        self.record_handshake(session, &response);
    }

    fn record_handshake(&self, session: &mut SessionState, response: &Value) {
        self.handshakes.fetch_add(1, Ordering::Relaxed);
        if handshake_succeeded(response) {
            debug!(
                target: TARGET,
                "Session initialized ({} tools advertised)",
                advertised_tool_count(response)
            );
            session.mark_initialized(response.clone());
        } else {
            warn!(
                target: TARGET,
                "Handshake failed, will retry on next call: {}",
                preview(response)
            );
        }
    }

    /// Write one request and wait for its response, all before `deadline`.
    ///
    /// The stdin lock is held across id allocation, registration and the
    /// write, so ids reach the wire in increasing order and an entry is always
    /// registered before its frame can be answered. A request whose deadline
    /// passes before it is written is never sent.
    async fn send_request(
        &self,
        process: &ServerProcess,
        method: &str,
        params: &Value,
        deadline: Instant,
    ) -> Value {
        let router = process.router();
        if Instant::now() >= deadline {
            return self.timed_out(method, None);
        }

        let (id, rx, _guard) = {
            let Ok(mut stdin) = timeout_at(deadline, process.stdin()).await else {
                return self.timed_out(method, None);
            };
            let id = RequestId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

            let frame = match JsonRpcRequest::new(id, method, params).to_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    return self.fail(id, method, format!("failed to encode request: {}", e));
                }
            };

            let rx = match router.register(id) {
                Ok(rx) => rx,
                Err(e) => return self.fail(id, method, e.to_string()),
            };
            let guard = PendingGuard::new(Arc::clone(router), id);

            debug!(
                target: TARGET,
                "=> {}",
                preview_str(String::from_utf8_lossy(&frame).trim_end())
            );
            match timeout_at(deadline, write_frame(&mut stdin, &frame)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return self.fail(id, method, format!("failed to write request: {}", e));
                }
                Err(_) => {
                    // A partial frame may be on the wire; nothing after it can be framed.
                    let failed = router.fail_all(WRITE_STALLED);
                    warn!(
                        target: TARGET,
                        "Subprocess stopped reading stdin, closed transport ({} other pending)",
                        failed.saturating_sub(1)
                    );
                    return self.timed_out(method, Some(id));
                }
            }
            (id, rx, guard)
        };

        match timeout_at(deadline, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => self.fail(id, method, "response channel closed".to_string()),
            Err(_) => self.timed_out(method, Some(id)),
        }
    }

    /// Timeout response for `id`, or for a fresh id when the request was
    /// never assigned one.
    fn timed_out(&self, method: &str, id: Option<RequestId>) -> Value {
        let id =
            id.unwrap_or_else(|| RequestId::new(self.next_id.fetch_add(1, Ordering::Relaxed)));
        warn!(target: TARGET, "Request {} ({}) timed out", id, method);
        ResponseError::timed_out().into_response(id)
    }

    fn fail(&self, id: RequestId, method: &str, message: String) -> Value {
        warn!(target: TARGET, "Request {} ({}) failed: {}", id, method, message);
        ResponseError::transport_failure(message).into_response(id)
    }
}

/// `timeout` from now, saturating for durations too large to represent.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365 * 30))
}

async fn write_frame(stdin: &mut ChildStdin, frame: &[u8]) -> std::io::Result<()> {
    stdin.write_all(frame).await?;
    stdin.flush().await
}
