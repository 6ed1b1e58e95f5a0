//! Synthetic JSON-RPC error responses.
//!
//! Timeouts and transport failures are reported to callers in the same shape
//! as a genuine error from the subprocess, so every `call` has exactly one
//! success/error discrimination point.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RequestId;
use super::frame::JSONRPC_VERSION;

/// Error codes used by synthetic responses
pub struct ErrorCodes;

impl ErrorCodes {
    /// No response arrived before the caller's deadline
    pub const REQUEST_TIMED_OUT: i32 = -32001;

    /// Write failure, subprocess death, or teardown while waiting
    pub const TRANSPORT_FAILURE: i32 = -32002;
}

/// JSON-RPC `error` member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    /// JSON-RPC error code
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseError {
    /// Create the timeout error
    pub fn timed_out() -> Self {
        Self {
            code: ErrorCodes::REQUEST_TIMED_OUT,
            message: "Request timed out".to_string(),
            data: None,
        }
    }

    /// Create a transport failure error carrying the underlying description
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCodes::TRANSPORT_FAILURE,
            message: message.into(),
            data: None,
        }
    }

    /// Wrap this error in a full JSON-RPC response envelope for `id`.
    pub fn into_response(self, id: RequestId) -> Value {
        serde_json::json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "error": self
        })
    }
}
