//! Drain task for subprocess stderr.
//!
//! Each line is forwarded to the log and nothing else; stderr never takes part
//! in request correlation. Draining keeps the subprocess from blocking on a
//! full pipe.

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::super::protocol::line_from_bytes;
use crate::logging::preview_str;

const TARGET: &str = "github_mcp_wrapper::proxy::stderr";

/// Handle to a running stderr drain task. Dropping it cancels the task.
pub(crate) struct StderrTaskHandle {
    join_handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl StderrTaskHandle {
    pub(crate) async fn shutdown(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.await
        {
            warn!(target: TARGET, "Stderr task ended abnormally: {}", e);
        }
    }
}

impl Drop for StderrTaskHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

pub(crate) fn spawn_stderr_task<R>(stderr: R) -> StderrTaskHandle
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let cancel_token = CancellationToken::new();
    let token_clone = cancel_token.clone();

    let join_handle = tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            tokio::select! {
                _ = token_clone.cancelled() => break,
                result = reader.read_until(b'\n', &mut buf) => match result {
                    Ok(0) => {
                        debug!(target: TARGET, "Subprocess stderr closed");
                        break;
                    }
                    Ok(_) => {
                        debug!(target: TARGET, "{}", preview_str(&line_from_bytes(&buf)));
                    }
                    Err(e) => {
                        debug!(target: TARGET, "Stderr read failed: {}", e);
                        break;
                    }
                },
            }
        }
    });

    StderrTaskHandle {
        join_handle: Some(join_handle),
        cancel_token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn drain_finishes_at_end_of_stream() {
        let stderr = tokio_test::io::Builder::new()
            .read(b"starting server\n")
            .read(b"no trailing newline")
            .build();
        let mut handle = spawn_stderr_task(stderr);

        tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
            .await
            .expect("drain should finish");
        assert!(handle.join_handle.is_none());
    }

    #[tokio::test]
    async fn shutdown_cancels_drain_on_open_stream() {
        let (_keep_open, stderr) = tokio::io::duplex(64);
        let mut handle = spawn_stderr_task(stderr);

        tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
            .await
            .expect("cancellation should stop the drain");
    }
}
