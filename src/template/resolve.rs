//! Provider configuration resolution.
//!
//! Locates the file a provider should use for a template. The corpus is
//! searched again on every call so the answer always reflects what is on
//! disk right now.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, VtError};

use super::descriptor::{is_template_dir, load_template};
use super::registry::{categories, walk_category, WalkControl};

/// A provider configuration file and the directory to run it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Absolute path to the provider's environment file.
    pub config_path: PathBuf,
    /// Directory containing `config_path`.
    pub working_dir: PathBuf,
}

/// Resolve the config file `provider` declares for template `id` under `root`.
pub fn resolve_config_path(root: &Path, id: &str, provider: &str) -> Result<ResolvedConfig> {
    for category in categories(root)? {
        let template_dir = match locate_in_category(&category, id) {
            Some(dir) => dir,
            None => continue,
        };

        let template = match load_template(&template_dir) {
            Ok(t) => t,
            Err(e) => {
                debug!(
                    "failed to load template {:?} from {}: {}",
                    id,
                    template_dir.display(),
                    e
                );
                continue;
            }
        };
        if template.id != id {
            continue;
        }

        let config = template
            .providers
            .get(provider)
            .ok_or_else(|| VtError::ProviderNotConfigured {
                id: id.to_string(),
                provider: provider.to_string(),
            })?;
        if config.path.trim().is_empty() {
            return Err(VtError::InvalidPath {
                id: id.to_string(),
                path: PathBuf::new(),
                reason: format!("{}.path is empty", provider),
            });
        }

        let declared = Path::new(&config.path);
        let config_path = if declared.is_absolute() {
            declared.to_path_buf()
        } else {
            std::path::absolute(template_dir.join(declared))?
        };
        if !config_path.is_file() {
            return Err(VtError::InvalidPath {
                id: id.to_string(),
                path: config_path,
                reason: "file does not exist".to_string(),
            });
        }

        let working_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| template_dir.clone());
        return Ok(ResolvedConfig {
            config_path,
            working_dir,
        });
    }

    Err(VtError::TemplateNotFound { id: id.to_string() })
}

/// Find the template directory named `id` inside one category.
fn locate_in_category(category: &Path, id: &str) -> Option<PathBuf> {
    let direct = category.join(id);
    if is_template_dir(&direct) && !is_symlink(&direct) {
        return Some(direct);
    }

    let mut found = None;
    let outcome = walk_category(category, |dir, name| {
        if name == id {
            found = Some(dir.to_path_buf());
            return Ok(WalkControl::Stop);
        }
        Ok(WalkControl::Continue)
    });
    if let Err(e) = outcome {
        debug!(
            "failed to find template {:?} in category {}: {}",
            id,
            category.display(),
            e
        );
        return None;
    }
    found
}

fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}
