//! Built-in configuration layer.

use super::settings::WrapperSettings;
use crate::proxy::protocol::DEFAULT_PROTOCOL_VERSION;

pub const DEFAULT_BINARY: &str = "/usr/local/bin/github-mcp-server";
pub const DEFAULT_CLIENT_NAME: &str = "agentcore-github-wrapper";
pub const DEFAULT_CLIENT_VERSION: &str = "0.1.0";
pub const DEFAULT_CREDENTIAL_ENV: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STDOUT_HISTORY: usize = 200;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 2;

/// The lowest-precedence layer: every field set.
pub fn default_settings() -> WrapperSettings {
    WrapperSettings {
        binary: Some(DEFAULT_BINARY.into()),
        args: Some(vec!["stdio".to_string()]),
        protocol_version: Some(DEFAULT_PROTOCOL_VERSION.to_string()),
        client_name: Some(DEFAULT_CLIENT_NAME.to_string()),
        client_version: Some(DEFAULT_CLIENT_VERSION.to_string()),
        request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        handshake_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        credential_env: Some(DEFAULT_CREDENTIAL_ENV.to_string()),
        stdout_history: Some(DEFAULT_STDOUT_HISTORY),
        shutdown_grace_secs: Some(DEFAULT_SHUTDOWN_GRACE_SECS),
        diagnostics: Some(false),
        log_level: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_every_required_field() {
        let settings = default_settings();
        assert_eq!(settings.args, Some(vec!["stdio".to_string()]));
        assert_eq!(settings.protocol_version.as_deref(), Some("2024-11-05"));
        assert_eq!(settings.client_name.as_deref(), Some("agentcore-github-wrapper"));
        assert!(settings.log_level.is_none());
    }
}
