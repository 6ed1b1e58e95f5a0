//! User configuration loading for github-mcp-wrapper.
//!
//! User config location: $XDG_CONFIG_HOME/github-mcp-wrapper/config.toml
//! Fallback: the platform config directory (`dirs::config_dir`), e.g.
//! ~/.config/github-mcp-wrapper/config.toml on Linux.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use super::settings::WrapperSettings;
use crate::error::{ProxyError, ProxyResult};

const APP_DIR: &str = "github-mcp-wrapper";
const FILE_NAME: &str = "config.toml";

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set and non-empty: $XDG_CONFIG_HOME/github-mcp-wrapper/config.toml
/// 2. Otherwise: `dirs::config_dir()`/github-mcp-wrapper/config.toml
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_path_from(std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from))
}

fn user_config_path_from(xdg_config_home: Option<PathBuf>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(dirs::config_dir)
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
}

/// Read and parse a configuration file.
///
/// A missing file is `Ok(None)`. An unreadable or malformed file is an error.
pub fn load_user_config(path: &Path) -> ProxyResult<Option<WrapperSettings>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(
                target: "github_mcp_wrapper::config",
                "No config file at {}",
                path.display()
            );
            return Ok(None);
        }
        Err(e) => return Err(ProxyError::Io(e)),
    };

    let settings = toml::from_str::<WrapperSettings>(&content)
        .map_err(|e| ProxyError::config(format!("{}: {}", path.display(), e)))?;
    debug!(
        target: "github_mcp_wrapper::config",
        "Loaded config file {}",
        path.display()
    );
    Ok(Some(settings))
}
