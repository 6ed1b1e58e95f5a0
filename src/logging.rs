//! Diagnostic logging setup.
//!
//! All components log through the `log` facade with a per-component target
//! (`github_mcp_wrapper::proxy::reader`, `...::stderr`, ...). The binary calls
//! [`init`] once; library users may install any other `log` backend instead.

use log::LevelFilter;
use serde_json::Value;

/// Maximum number of characters of a payload written to the log.
pub const PAYLOAD_PREVIEW_LIMIT: usize = 800;

/// Install `env_logger` on stderr with `level` as the default filter.
///
/// `RUST_LOG`, when set, overrides `level`. Calling this more than once is
/// harmless; only the first call installs a logger.
pub fn init(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(true)
        .try_init();
}

/// Compact JSON rendering of `value`, cut at [`PAYLOAD_PREVIEW_LIMIT`] chars.
pub(crate) fn preview(value: &Value) -> String {
    preview_str(&value.to_string())
}

/// `text` cut at [`PAYLOAD_PREVIEW_LIMIT`] chars.
pub(crate) fn preview_str(text: &str) -> String {
    match text.char_indices().nth(PAYLOAD_PREVIEW_LIMIT) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
