//! Reader task for subprocess stdout.
//!
//! The Reader Task:
//! - Runs in a spawned tokio task for the whole subprocess lifetime
//! - Reads one newline-delimited frame at a time
//! - Routes responses via ResponseRouter to oneshot waiters
//! - Logs and drops notifications, unroutable responses and undecodable lines
//! - On EOF or read error fails every pending request, then exits

use std::sync::Arc;

use log::{debug, trace, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::super::protocol::{InboundFrame, line_from_bytes};
use super::super::stdout_log::StdoutLog;
use super::{ResponseRouter, RouteResult};
use crate::logging::{preview, preview_str};

const TARGET: &str = "github_mcp_wrapper::proxy::reader";

/// Reason handed to waiters when stdout reaches end-of-stream.
const SUBPROCESS_TERMINATED: &str = "subprocess terminated";

/// Handle to a running Reader Task.
///
/// Dropping the handle cancels the task.
pub(crate) struct ReaderTaskHandle {
    join_handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl ReaderTaskHandle {
    /// Ask the task to stop and wait for it to finish.
    pub(crate) async fn shutdown(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.await
        {
            warn!(target: TARGET, "Reader task ended abnormally: {}", e);
        }
    }

    /// Whether the task has exited (EOF, read error or cancellation).
    pub(crate) fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_none_or(|handle| handle.is_finished())
    }
}

impl Drop for ReaderTaskHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Spawn a reader task that reads frames from `stdout` and routes them.
///
/// # Arguments
/// * `stdout` - The subprocess stdout (or any byte stream in tests)
/// * `router` - The ResponseRouter to route responses to waiters
/// * `stdout_log` - History that receives every raw line
pub(crate) fn spawn_reader_task<R>(
    stdout: R,
    router: Arc<ResponseRouter>,
    stdout_log: Arc<StdoutLog>,
) -> ReaderTaskHandle
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let cancel_token = CancellationToken::new();
    let token_clone = cancel_token.clone();

    let join_handle = tokio::spawn(reader_loop(
        BufReader::new(stdout),
        router,
        stdout_log,
        token_clone,
    ));

    ReaderTaskHandle {
        join_handle: Some(join_handle),
        cancel_token,
    }
}

/// The main reader loop - reads lines and routes them.
async fn reader_loop<R>(
    mut reader: BufReader<R>,
    router: Arc<ResponseRouter>,
    stdout_log: Arc<StdoutLog>,
    cancel_token: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!(target: TARGET, "Reader task cancelled, shutting down");
                break;
            }

            result = reader.read_until(b'\n', &mut buf) => {
                match result {
                    Ok(0) => {
                        let failed = router.fail_all(SUBPROCESS_TERMINATED);
                        debug!(
                            target: TARGET,
                            "Subprocess stdout closed, failed {} pending request(s)",
                            failed
                        );
                        break;
                    }
                    Ok(_) => {
                        let line = line_from_bytes(&buf);
                        stdout_log.push(&line);
                        handle_line(&line, &router);
                    }
                    Err(e) => {
                        warn!(
                            target: TARGET,
                            "Reader error: {}, failing pending requests",
                            e
                        );
                        router.fail_all(&format!("subprocess output read failed: {}", e));
                        break;
                    }
                }
            }
        }
    }
}

/// Decode a single line and deliver it if it answers a pending request.
fn handle_line(line: &str, router: &ResponseRouter) {
    trace!(target: TARGET, "raw {}", preview_str(line));

    let frame = InboundFrame::decode(line);
    let id = frame.request_id();
    let message = match frame {
        InboundFrame::Blank => return,
        InboundFrame::Unparsed(raw) => {
            warn!(
                target: TARGET,
                "Undecodable subprocess output, dropping: {}",
                preview_str(&raw)
            );
            return;
        }
        InboundFrame::Message(message) => message,
    };

    debug!(target: TARGET, "<= {}", preview(&message));
    match router.route(message) {
        RouteResult::Delivered => {}
        RouteResult::ReceiverDropped => {
            debug!(target: TARGET, "Waiter for id {:?} already gone, dropping", id);
        }
        RouteResult::NotPending => {
            debug!(
                target: TARGET,
                "Response for unknown request id {:?}, dropping",
                id
            );
        }
        RouteResult::NoId => {
            debug!(target: TARGET, "Message without routable id, dropping");
        }
    }
}
