//! Pending request table.
//!
//! The ResponseRouter maps each in-flight correlation id to a oneshot sender:
//! - The dispatcher calls `register(id)` before writing the request frame
//! - The reader task calls `route(message)` for every decoded message
//! - The dispatcher awaits the receiver without holding any lock
//!
//! Every entry is removed exactly once, by `route`, `remove` or `fail_all`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use super::super::protocol::{RequestId, ResponseError};

/// Why a registration was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RegisterError {
    /// The id is already waiting for a response.
    #[error("request id {0} is already pending")]
    Duplicate(RequestId),
    /// The subprocess output stream is gone; nothing can be delivered anymore.
    #[error("{0}")]
    Closed(String),
}

/// Outcome of routing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteResult {
    /// Delivered to its waiter.
    Delivered,
    /// Matched a pending id but the waiter had already gone away.
    ReceiverDropped,
    /// Matching id was not pending (late, duplicate or unsolicited response).
    NotPending,
    /// Message carries no integral id (notification or junk).
    NoId,
}

/// Routes responses to pending requests via oneshot channels.
///
/// Thread-safe; shared between the dispatcher and a single reader task.
pub(crate) struct ResponseRouter {
    state: std::sync::Mutex<RouterState>,
}

struct RouterState {
    pending: HashMap<RequestId, oneshot::Sender<Value>>,
    /// Set once by `fail_all`; carries the reason handed to late registrants.
    closed: Option<String>,
}

impl ResponseRouter {
    /// Create a new empty ResponseRouter.
    pub(crate) fn new() -> Self {
        Self {
            state: std::sync::Mutex::new(RouterState {
                pending: HashMap::new(),
                closed: None,
            }),
        }
    }

    /// Register a pending request and return a receiver for the response.
    ///
    /// Must be called before writing the request so a fast response cannot
    /// race past its own registration.
    pub(crate) fn register(
        &self,
        id: RequestId,
    ) -> Result<oneshot::Receiver<Value>, RegisterError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(reason) = &state.closed {
            return Err(RegisterError::Closed(reason.clone()));
        }
        if state.pending.contains_key(&id) {
            return Err(RegisterError::Duplicate(id));
        }

        let (tx, rx) = oneshot::channel();
        state.pending.insert(id, tx);
        Ok(rx)
    }

    /// Route a decoded message to its pending request.
    ///
    /// Messages without a pending id are dropped.
    pub(crate) fn route(&self, message: Value) -> RouteResult {
        let Some(id) = RequestId::from_json(&message) else {
            return RouteResult::NoId;
        };

        // Release the lock before sending
        let sender = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.pending.remove(&id)
        };

        match sender {
            Some(tx) => match tx.send(message) {
                Ok(()) => RouteResult::Delivered,
                Err(_) => RouteResult::ReceiverDropped,
            },
            None => RouteResult::NotPending,
        }
    }

    /// Remove a pending request without sending a response.
    ///
    /// Returns `true` if the request was removed, `false` if it wasn't pending.
    pub(crate) fn remove(&self, id: RequestId) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending.remove(&id).is_some()
    }

    /// Get the number of pending requests.
    pub(crate) fn pending_count(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending.len()
    }

    /// Whether `fail_all` has run.
    pub(crate) fn is_closed(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.closed.is_some()
    }

    /// Fail every pending request with a transport-failure response and
    /// refuse all future registrations.
    ///
    /// Called when the subprocess output stream ends or the proxy is torn
    /// down, so no caller waits on a response that can never arrive.
    /// Returns how many waiters were failed.
    pub(crate) fn fail_all(&self, error_message: &str) -> usize {
        let entries: Vec<_> = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.closed.is_none() {
                state.closed = Some(error_message.to_string());
            }
            state.pending.drain().collect()
        };

        let failed = entries.len();
        for (id, tx) in entries {
            let response = ResponseError::transport_failure(error_message).into_response(id);
            let _ = tx.send(response);
        }
        failed
    }
}

/// Removes its id from the router when dropped.
///
/// Held by the dispatcher while it waits, so a caller that abandons its
/// `call` future does not leave a stale entry behind. Removing an id that
/// was already routed is a no-op.
pub(crate) struct PendingGuard {
    router: Arc<ResponseRouter>,
    id: RequestId,
}

impl PendingGuard {
    pub(crate) fn new(router: Arc<ResponseRouter>, id: RequestId) -> Self {
        Self { router, id }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.router.remove(self.id);
    }
}
