//! Subprocess ownership: spawn, standard streams, background tasks, teardown.
//!
//! One `ServerProcess` exists per live subprocess. It owns the child, the
//! stdin writer, the response router fed by its reader task and the session
//! state of that subprocess, so replacing the process replaces all of them.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::process::{Child, ChildStdin, Command};

use super::actor::{
    ReaderTaskHandle, ResponseRouter, StderrTaskHandle, spawn_reader_task, spawn_stderr_task,
};
use super::session::SessionState;
use super::stdout_log::StdoutLog;
use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};

const TARGET: &str = "github_mcp_wrapper::proxy::process";

/// Reason handed to waiters still pending when the proxy tears the process down.
pub(crate) const PROXY_SHUT_DOWN: &str = "proxy shut down";

struct BackgroundTasks {
    reader: ReaderTaskHandle,
    stderr: StderrTaskHandle,
}

/// A running subprocess and everything scoped to its lifetime.
pub(crate) struct ServerProcess {
    /// Stdin, serialized so that id allocation, registration and the write
    /// happen as one step.
    stdin: tokio::sync::Mutex<ChildStdin>,
    router: Arc<ResponseRouter>,
    /// Held across the whole handshake exchange so other calls queue behind it.
    session: tokio::sync::Mutex<SessionState>,
    child: tokio::sync::Mutex<Child>,
    tasks: tokio::sync::Mutex<Option<BackgroundTasks>>,
    pid: Option<u32>,
}

impl ServerProcess {
    /// Spawn the configured binary with all three standard streams piped and
    /// start the reader and stderr tasks.
    ///
    /// The child is killed if this handle is dropped without `shutdown`.
    pub(crate) fn spawn(config: &ProxyConfig, stdout_log: Arc<StdoutLog>) -> ProxyResult<Self> {
        let mut child = Command::new(&config.binary)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProxyError::process_spawn(&config.binary, e))?;

        let stdin = child.stdin.take().ok_or_else(|| missing_stream(config, "stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_stream(config, "stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_stream(config, "stderr"))?;
        let pid = child.id();

        debug!(
            target: TARGET,
            "Spawned {} {:?} (pid {:?})",
            config.binary.display(),
            config.args,
            pid
        );
        if let Some(report) = credential_report(config) {
            info!(target: TARGET, "{}", report);
        }

        let router = Arc::new(ResponseRouter::new());
        let reader = spawn_reader_task(stdout, Arc::clone(&router), stdout_log);
        let stderr = spawn_stderr_task(stderr);

        Ok(Self {
            stdin: tokio::sync::Mutex::new(stdin),
            router,
            session: tokio::sync::Mutex::new(SessionState::default()),
            child: tokio::sync::Mutex::new(child),
            tasks: tokio::sync::Mutex::new(Some(BackgroundTasks { reader, stderr })),
            pid,
        })
    }

    pub(crate) async fn stdin(&self) -> tokio::sync::MutexGuard<'_, ChildStdin> {
        self.stdin.lock().await
    }

    pub(crate) fn router(&self) -> &Arc<ResponseRouter> {
        &self.router
    }

    pub(crate) async fn session(&self) -> tokio::sync::MutexGuard<'_, SessionState> {
        self.session.lock().await
    }

    /// Whether the reader is still attached to a live output stream.
    pub(crate) fn is_alive(&self) -> bool {
        !self.router.is_closed()
    }

    /// Tear the subprocess down.
    ///
    /// 1. Fail every pending waiter with a transport-failure response
    /// 2. Stop the reader and stderr tasks
    /// 3. SIGTERM (Unix), wait up to `grace` for exit
    /// 4. Kill if still running
    ///
    /// Safe to call more than once.
    pub(crate) async fn shutdown(&self, grace: Duration) {
        let failed = self.router.fail_all(PROXY_SHUT_DOWN);
        if failed > 0 {
            debug!(target: TARGET, "Failed {} pending request(s) on shutdown", failed);
        }

        if let Some(mut tasks) = self.tasks.lock().await.take() {
            tasks.reader.shutdown().await;
            tasks.stderr.shutdown().await;
        }

        let mut child = self.child.lock().await;
        terminate(&mut child, self.pid, grace).await;
    }
}

/// Whether the credential variable is set, reported only in diagnostics mode.
/// The value itself is never logged.
fn credential_report(config: &ProxyConfig) -> Option<String> {
    if !config.diagnostics {
        return None;
    }
    let present =
        std::env::var_os(&config.credential_env).is_some_and(|value| !value.is_empty());
    Some(format!("Credential {} present: {}", config.credential_env, present))
}

fn missing_stream(config: &ProxyConfig, stream: &str) -> ProxyError {
    ProxyError::process_spawn(
        &config.binary,
        std::io::Error::other(format!("failed to capture {}", stream)),
    )
}

/// SIGTERM then kill, skipping whatever is unnecessary for an exited child.
async fn terminate(child: &mut Child, pid: Option<u32>, grace: Duration) {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(target: TARGET, "Subprocess already exited: {}", status);
            return;
        }
        Ok(None) => {}
        Err(e) => warn!(target: TARGET, "Failed to query subprocess status: {}", e),
    }

    #[cfg(unix)]
    if let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        match kill(Pid::from_raw(pid), Signal::SIGTERM) {
            Ok(()) => {
                if let Ok(Ok(status)) = tokio::time::timeout(grace, child.wait()).await {
                    debug!(target: TARGET, "Subprocess exited after SIGTERM: {}", status);
                    return;
                }
                debug!(
                    target: TARGET,
                    "Subprocess ignored SIGTERM for {:?}, killing",
                    grace
                );
            }
            Err(e) => debug!(target: TARGET, "SIGTERM failed: {}", e),
        }
    }
    #[cfg(not(unix))]
    let _ = (pid, grace);

    if let Err(e) = child.kill().await {
        warn!(target: TARGET, "Failed to kill subprocess: {}", e);
    }
}
