//! Configuration file discovery and loading.
//!
//! Settings are layered: built-in defaults, then the user config file,
//! then `VT_*` environment variables. Command-line flags are applied last
//! by the caller.

use crate::config::schema::AppConfig;
use crate::error::{Result, VtError};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `templates_path`.
pub const ENV_TEMPLATES_PATH: &str = "VT_TEMPLATES_PATH";
/// Overrides `remote_repository`.
pub const ENV_REMOTE_REPOSITORY: &str = "VT_REMOTE_REPOSITORY";
/// Overrides `phase_timeout_secs`.
pub const ENV_PHASE_TIMEOUT: &str = "VT_PHASE_TIMEOUT";

/// Location of the user's config file: `~/.vt/config.yml`.
pub fn user_config_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".vt").join("config.yml"))
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `Config` if the file cannot be read or the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| VtError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into an [`AppConfig`].
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<AppConfig> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(content).map_err(|e| VtError::Config {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })?;
    check_phase_timeout(config.phase_timeout_secs, source_path)?;
    Ok(config)
}

fn check_phase_timeout(secs: u64, source: &Path) -> Result<()> {
    if secs == 0 {
        return Err(VtError::Config {
            path: source.to_path_buf(),
            message: "phase_timeout_secs must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Apply `VT_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_TEMPLATES_PATH).filter(|v| !v.is_empty()) {
        config.templates_path = PathBuf::from(path);
    }

    if let Some(remote) = lookup(ENV_REMOTE_REPOSITORY).filter(|v| !v.is_empty()) {
        config.remote_repository = remote;
    }

    if let Some(raw) = lookup(ENV_PHASE_TIMEOUT).filter(|v| !v.is_empty()) {
        config.phase_timeout_secs = raw.trim().parse().map_err(|_| VtError::Config {
            path: PathBuf::from(ENV_PHASE_TIMEOUT),
            message: format!("expected a number of seconds, got '{}'", raw),
        })?;
        check_phase_timeout(config.phase_timeout_secs, Path::new(ENV_PHASE_TIMEOUT))?;
    }

    Ok(())
}

/// Load configuration.
///
/// Reads `config_override` if given, otherwise `~/.vt/config.yml` when it
/// exists, then applies environment overrides.
pub fn load_config(config_override: Option<&Path>) -> Result<AppConfig> {
    let path = match config_override {
        Some(path) => Some(path.to_path_buf()),
        None => user_config_path().filter(|p| p.exists()),
    };

    let mut config = match path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            load_config_file(&path)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}
