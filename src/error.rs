//! Error handling types for github-mcp-wrapper
//!
//! Only failures that callers must act on live here. Timeouts, transport
//! failures and undecodable subprocess output are folded into synthetic
//! JSON-RPC error responses by the proxy and never become a `ProxyError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the proxy and its configuration layer
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The subprocess could not be created (missing binary, permission denied,
    /// or a standard stream could not be captured)
    #[error("Failed to spawn {}: {source}", binary.display())]
    ProcessSpawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Helper functions for common error patterns
impl ProxyError {
    /// Create a spawn error for the given binary
    pub fn process_spawn(binary: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProxyError::ProcessSpawn {
            binary: binary.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ProxyError::Config {
            message: message.into(),
        }
    }
}
