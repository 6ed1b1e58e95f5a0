//! Per-subprocess session state.
//!
//! A session lives exactly as long as one subprocess. The flag is set by a
//! successful handshake and cleared when a caller sends the handshake method
//! explicitly.

use serde_json::Value;

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    initialized: bool,
    init_response: Option<Value>,
}

impl SessionState {
    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn init_response(&self) -> Option<&Value> {
        self.init_response.as_ref()
    }

    /// Forget the current session so the next handshake starts over.
    pub(crate) fn reset(&mut self) {
        self.initialized = false;
    }

    /// Record a successful handshake and cache its response.
    pub(crate) fn mark_initialized(&mut self, response: Value) {
        self.initialized = true;
        self.init_response = Some(response);
    }
}
