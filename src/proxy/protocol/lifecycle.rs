//! Session handshake message builders.
//!
//! Provides the capability-negotiation payload sent as the first request of
//! every subprocess session, and the success test applied to its response.

use serde_json::Value;

/// Method name of the session handshake.
pub const HANDSHAKE_METHOD: &str = "initialize";

/// Protocol version offered when no override is configured.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Build the params of the handshake request.
///
/// # Arguments
/// * `protocol_version` - Version string offered to the server
/// * `client_name` - Static client identification name
/// * `client_version` - Static client identification version
pub(crate) fn build_initialize_params(
    protocol_version: &str,
    client_name: &str,
    client_version: &str,
) -> Value {
    serde_json::json!({
        "protocolVersion": protocol_version,
        "capabilities": {},
        "clientInfo": {
            "name": client_name,
            "version": client_version
        }
    })
}

/// Whether a handshake response counts as success.
///
/// Only an explicit top-level `result` member is success. A response with
/// neither `result` nor `error` is a failure, as is any non-object value.
pub(crate) fn handshake_succeeded(response: &Value) -> bool {
    response
        .as_object()
        .is_some_and(|object| object.contains_key("result"))
}

/// Number of tools advertised in a handshake result, for diagnostics.
pub(crate) fn advertised_tool_count(response: &Value) -> usize {
    response
        .get("result")
        .and_then(|result| result.get("tools"))
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}
