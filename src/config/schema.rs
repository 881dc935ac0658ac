//! Configuration schema for `~/.vt/config.yml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::provider::PROVIDER_NAME;
use crate::template::TEMPLATE_REMOTE_REPOSITORY;

/// Directory name of the corpus under the home directory.
pub const DEFAULT_TEMPLATES_DIR: &str = "vt-templates";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Local checkout of the template corpus.
    pub templates_path: PathBuf,

    /// Git remote the corpus is synced from.
    pub remote_repository: String,

    /// Deadline for each provider phase, in seconds.
    pub phase_timeout_secs: u64,

    /// Provider used when none is named on the command line.
    pub default_provider: String,

    /// Default output verbosity.
    pub default_output: OutputMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            templates_path: default_templates_path(),
            remote_repository: TEMPLATE_REMOTE_REPOSITORY.to_string(),
            phase_timeout_secs: 600,
            default_provider: PROVIDER_NAME.to_string(),
            default_output: OutputMode::Normal,
        }
    }
}

impl AppConfig {
    /// Phase deadline as a duration.
    pub fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.phase_timeout_secs)
    }
}

fn default_templates_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_TEMPLATES_DIR)
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}
