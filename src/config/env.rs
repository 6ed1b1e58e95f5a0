//! Environment configuration layer.
//!
//! Reads go through a lookup function so callers (and tests) decide where
//! values come from. The binary passes `|key| std::env::var(key).ok()`.

use std::path::PathBuf;

use super::settings::WrapperSettings;

pub const BINARY_VAR: &str = "GITHUB_MCP_BINARY";
pub const PROTOCOL_VERSION_VAR: &str = "GITHUB_MCP_PROTOCOL_VERSION";
pub const DIAGNOSTICS_VAR: &str = "GITHUB_MCP_LOG";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Build the environment layer. Unset and empty variables leave the field unset.
pub fn settings_from_env<F>(lookup: F) -> WrapperSettings
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let log_level = get(LOG_LEVEL_VAR).map(|level| level.trim().to_ascii_lowercase());
    let verbose_level = log_level
        .as_deref()
        .is_some_and(|level| level == "debug" || level == "trace");
    let diagnostics = match get(DIAGNOSTICS_VAR) {
        Some(flag) => Some(flag.trim() == "1" || verbose_level),
        None if verbose_level => Some(true),
        None => None,
    };

    WrapperSettings {
        binary: get(BINARY_VAR).map(PathBuf::from),
        protocol_version: get(PROTOCOL_VERSION_VAR),
        diagnostics,
        log_level,
        ..WrapperSettings::default()
    }
}
