use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One configuration layer.
///
/// Every field is optional so a layer only overrides what it sets. The same
/// shape is read from the user TOML file, built from environment variables and
/// built from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WrapperSettings {
    /// Path to the wrapped server binary.
    pub binary: Option<PathBuf>,
    /// Arguments passed to the binary (`["stdio"]` by default).
    pub args: Option<Vec<String>>,
    /// `protocolVersion` sent in the handshake.
    pub protocol_version: Option<String>,
    /// `clientInfo.name` sent in the handshake.
    pub client_name: Option<String>,
    /// `clientInfo.version` sent in the handshake.
    pub client_version: Option<String>,
    /// Default per-call deadline, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Deadline for the automatic handshake, in seconds.
    pub handshake_timeout_secs: Option<u64>,
    /// Name of the environment variable holding the server credential.
    /// Only its presence is ever logged.
    pub credential_env: Option<String>,
    /// Number of raw stdout lines kept for inspection.
    pub stdout_history: Option<usize>,
    /// Time between SIGTERM and kill on shutdown, in seconds.
    pub shutdown_grace_secs: Option<u64>,
    /// Turn diagnostic logging on.
    pub diagnostics: Option<bool>,
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: Option<String>,
}
