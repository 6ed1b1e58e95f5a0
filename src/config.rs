pub mod defaults;
pub mod env;
pub mod settings;
pub mod user;

pub use env::settings_from_env;
pub use settings::WrapperSettings;
pub use user::{load_user_config, user_config_path};

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;

use crate::error::{ProxyError, ProxyResult};

/// Fully resolved proxy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyConfig {
    pub binary: PathBuf,
    pub args: Vec<String>,
    pub protocol_version: String,
    pub client_name: String,
    pub client_version: String,
    pub request_timeout: Duration,
    pub handshake_timeout: Duration,
    pub credential_env: String,
    pub stdout_history: usize,
    pub shutdown_grace: Duration,
    pub diagnostics: bool,
    /// Default filter for the logger; at least `Debug` when `diagnostics` is on.
    pub log_level: LevelFilter,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig::from(defaults::default_settings())
    }
}

impl From<WrapperSettings> for ProxyConfig {
    /// Fields the layer leaves unset fall back to the built-in defaults.
    fn from(settings: WrapperSettings) -> Self {
        let settings = merge_all(&[Some(defaults::default_settings()), Some(settings)])
            .unwrap_or_else(defaults::default_settings);

        let requested = settings
            .log_level
            .as_deref()
            .and_then(|level| LevelFilter::from_str(level).ok())
            .unwrap_or(LevelFilter::Warn);
        let diagnostics = settings.diagnostics.unwrap_or(false) || requested >= LevelFilter::Debug;
        let log_level = if diagnostics {
            requested.max(LevelFilter::Debug)
        } else {
            requested
        };

        ProxyConfig {
            binary: settings.binary.unwrap_or_else(|| defaults::DEFAULT_BINARY.into()),
            args: settings.args.unwrap_or_default(),
            protocol_version: settings.protocol_version.unwrap_or_default(),
            client_name: settings.client_name.unwrap_or_default(),
            client_version: settings.client_version.unwrap_or_default(),
            request_timeout: Duration::from_secs(
                settings
                    .request_timeout_secs
                    .unwrap_or(defaults::DEFAULT_TIMEOUT_SECS),
            ),
            handshake_timeout: Duration::from_secs(
                settings
                    .handshake_timeout_secs
                    .unwrap_or(defaults::DEFAULT_TIMEOUT_SECS),
            ),
            credential_env: settings.credential_env.unwrap_or_default(),
            stdout_history: settings
                .stdout_history
                .unwrap_or(defaults::DEFAULT_STDOUT_HISTORY),
            shutdown_grace: Duration::from_secs(
                settings
                    .shutdown_grace_secs
                    .unwrap_or(defaults::DEFAULT_SHUTDOWN_GRACE_SECS),
            ),
            diagnostics,
            log_level,
        }
    }
}

/// Merge multiple WrapperSettings layers in order.
/// Later layers in the slice have higher precedence (override earlier ones).
/// Use this for layered config: `merge_all(&[defaults, user, env, cli])`
pub fn merge_all(configs: &[Option<WrapperSettings>]) -> Option<WrapperSettings> {
    configs.iter().cloned().reduce(merge_settings).flatten()
}

/// Merge two WrapperSettings, preferring values from `primary` over `fallback`
pub fn merge_settings(
    fallback: Option<WrapperSettings>,
    primary: Option<WrapperSettings>,
) -> Option<WrapperSettings> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) => Some(settings),
        (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(WrapperSettings {
            binary: primary.binary.or(fallback.binary),
            args: primary.args.or(fallback.args),
            protocol_version: primary.protocol_version.or(fallback.protocol_version),
            client_name: primary.client_name.or(fallback.client_name),
            client_version: primary.client_version.or(fallback.client_version),
            request_timeout_secs: primary.request_timeout_secs.or(fallback.request_timeout_secs),
            handshake_timeout_secs: primary
                .handshake_timeout_secs
                .or(fallback.handshake_timeout_secs),
            credential_env: primary.credential_env.or(fallback.credential_env),
            stdout_history: primary.stdout_history.or(fallback.stdout_history),
            shutdown_grace_secs: primary.shutdown_grace_secs.or(fallback.shutdown_grace_secs),
            diagnostics: primary.diagnostics.or(fallback.diagnostics),
            log_level: primary.log_level.or(fallback.log_level),
        }),
    }
}

/// Resolve the full configuration stack: defaults < user file < environment < CLI.
///
/// `config_path` replaces the default user config location; unlike the
/// default location it must exist.
pub fn resolve<F>(
    config_path: Option<&Path>,
    env_lookup: F,
    cli: WrapperSettings,
) -> ProxyResult<ProxyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let user = match config_path {
        Some(path) => Some(load_user_config(path)?.ok_or_else(|| {
            ProxyError::config(format!("config file {} not found", path.display()))
        })?),
        None => match user_config_path() {
            Some(path) => load_user_config(&path)?,
            None => None,
        },
    };

    let merged = merge_all(&[
        Some(defaults::default_settings()),
        user,
        Some(settings_from_env(env_lookup)),
        Some(cli),
    ])
    .unwrap_or_else(defaults::default_settings);

    Ok(ProxyConfig::from(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_merge_all_empty_slice_returns_none() {
        assert!(merge_all(&[]).is_none());
    }

    #[test]
    fn test_merge_all_skips_none_configs() {
        let layer = WrapperSettings {
            client_name: Some("probe".to_string()),
            ..Default::default()
        };
        let result = merge_all(&[None, Some(layer), None]).unwrap();
        assert_eq!(result.client_name.as_deref(), Some("probe"));
    }

    #[test]
    fn test_merge_all_four_layers() {
        let user = WrapperSettings {
            binary: Some("/user/bin/server".into()),
            request_timeout_secs: Some(10),
            ..Default::default()
        };
        let env = WrapperSettings {
            protocol_version: Some("2025-03-26".to_string()),
            request_timeout_secs: None,
            ..Default::default()
        };
        let cli = WrapperSettings {
            binary: Some("/cli/bin/server".into()),
            ..Default::default()
        };

        let result = merge_all(&[
            Some(defaults::default_settings()),
            Some(user),
            Some(env),
            Some(cli),
        ])
        .unwrap();

        // binary: CLI wins
        assert_eq!(result.binary, Some(PathBuf::from("/cli/bin/server")));
        // timeout: user wins over defaults, nothing later overrides
        assert_eq!(result.request_timeout_secs, Some(10));
        // protocol version: env wins
        assert_eq!(result.protocol_version.as_deref(), Some("2025-03-26"));
        // untouched: defaults
        assert_eq!(result.args, Some(vec!["stdio".to_string()]));
    }

    #[test]
    fn default_config_matches_documented_values() {
        let config = ProxyConfig::default();
        assert_eq!(config.binary, PathBuf::from("/usr/local/bin/github-mcp-server"));
        assert_eq!(config.args, vec!["stdio"]);
        assert_eq!(config.protocol_version, "2024-11-05");
        assert_eq!(config.client_name, "agentcore-github-wrapper");
        assert_eq!(config.client_version, "0.1.0");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.handshake_timeout, Duration::from_secs(30));
        assert_eq!(config.credential_env, "GITHUB_PERSONAL_ACCESS_TOKEN");
        assert_eq!(config.stdout_history, 200);
        assert_eq!(config.shutdown_grace, Duration::from_secs(2));
        assert!(!config.diagnostics);
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn diagnostics_raise_log_level_to_debug() {
        let config = ProxyConfig::from(WrapperSettings {
            diagnostics: Some(true),
            ..Default::default()
        });
        assert!(config.diagnostics);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn trace_level_enables_diagnostics_and_is_kept() {
        let config = ProxyConfig::from(WrapperSettings {
            log_level: Some("trace".to_string()),
            ..Default::default()
        });
        assert!(config.diagnostics);
        assert_eq!(config.log_level, LevelFilter::Trace);
    }

    #[test]
    fn unknown_log_level_falls_back_to_warn() {
        let config = ProxyConfig::from(WrapperSettings {
            log_level: Some("loud".to_string()),
            ..Default::default()
        });
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn resolve_layers_explicit_file_env_and_cli() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "binary = \"/from/file\"\nclient_name = \"file-client\"\nrequest_timeout_secs = 7"
        )
        .unwrap();

        let env = |key: &str| match key {
            "GITHUB_MCP_BINARY" => Some("/from/env".to_string()),
            _ => None,
        };
        let cli = WrapperSettings {
            request_timeout_secs: Some(3),
            ..Default::default()
        };

        let config = resolve(Some(file.path()), env, cli).unwrap();
        assert_eq!(config.binary, PathBuf::from("/from/env"));
        assert_eq!(config.client_name, "file-client");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn resolve_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(
            Some(dir.path().join("nope.toml").as_path()),
            |_| None,
            WrapperSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ProxyError::Config { .. }), "{:?}", err);
    }
}
