//! Template corpus synchronisation.
//!
//! Keeps a local git checkout of the template corpus up to date. Local
//! modifications are never discarded unless the caller forces it.

use anyhow::{bail, Context};
use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{Result, VtError};

/// Default remote repository for the template corpus.
pub const TEMPLATE_REMOTE_REPOSITORY: &str = "https://github.com/HappyHackingSpace/vt-templates";

/// What a sync did to the local corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Corpus was cloned fresh.
    Cloned { commit_sha: String },
    /// Corpus moved to a newer commit.
    Updated { from: String, to: String },
    /// Corpus was already at the remote head.
    UpToDate { commit_sha: String },
}

/// Fetches or updates a local mirror of a remote template corpus.
#[derive(Debug, Clone)]
pub struct CorpusSync {
    remote: String,
}

impl Default for CorpusSync {
    fn default() -> Self {
        Self::new(TEMPLATE_REMOTE_REPOSITORY)
    }
}

impl CorpusSync {
    /// Create a syncer for the given remote URL (or local path).
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
        }
    }

    /// Remote this syncer pulls from.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Clone the corpus into `path` if absent, otherwise update it.
    ///
    /// A dirty checkout fails with [`VtError::DirtyCorpus`] unless `force`
    /// is set, in which case it is reset to the remote head.
    pub fn sync(&self, path: &Path, force: bool) -> Result<SyncOutcome> {
        if !path.exists() {
            return self.clone_fresh(path);
        }

        if !is_work_tree(path) {
            if !force {
                return Err(VtError::SyncFailed {
                    message: format!("{} exists but is not a git repository", path.display()),
                });
            }
            warn!("replacing non-repository directory {}", path.display());
            fs::remove_dir_all(path)?;
            return self.clone_fresh(path);
        }

        let dirty = is_dirty(path).map_err(sync_failed)?;
        if dirty && !force {
            return Err(VtError::DirtyCorpus {
                path: path.to_path_buf(),
            });
        }

        let before = head_sha(path).map_err(sync_failed)?;
        if dirty {
            info!("discarding local changes in {}", path.display());
            force_update(path).map_err(sync_failed)?;
        } else {
            fast_forward(path).map_err(sync_failed)?;
        }
        let after = head_sha(path).map_err(sync_failed)?;

        if before == after {
            Ok(SyncOutcome::UpToDate { commit_sha: after })
        } else {
            Ok(SyncOutcome::Updated {
                from: before,
                to: after,
            })
        }
    }

    fn clone_fresh(&self, path: &Path) -> Result<SyncOutcome> {
        info!("cloning {}", self.remote);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if let Err(e) = run_git(
            None,
            &["clone", "--depth", "1", &self.remote, &path.to_string_lossy()],
        ) {
            if path.exists() {
                if let Err(cleanup) = fs::remove_dir_all(path) {
                    return Err(sync_failed(e.context(format!("cleanup failed: {cleanup}"))));
                }
            }
            return Err(sync_failed(e));
        }

        let commit_sha = head_sha(path).map_err(sync_failed)?;
        Ok(SyncOutcome::Cloned { commit_sha })
    }
}

fn sync_failed(err: anyhow::Error) -> VtError {
    VtError::SyncFailed {
        message: format!("{:#}", err),
    }
}

/// True only when `path` is the top level of a work tree, not a subdirectory
/// of some enclosing repository.
fn is_work_tree(path: &Path) -> bool {
    let Ok(top) = run_git(Some(path), &["rev-parse", "--show-toplevel"]) else {
        return false;
    };
    match (fs::canonicalize(top.trim()), fs::canonicalize(path)) {
        (Ok(top), Ok(path)) => top == path,
        _ => false,
    }
}

fn is_dirty(path: &Path) -> anyhow::Result<bool> {
    let status = run_git(Some(path), &["status", "--porcelain"])?;
    Ok(!status.trim().is_empty())
}

fn fast_forward(path: &Path) -> anyhow::Result<()> {
    run_git(Some(path), &["pull", "--ff-only"])?;
    Ok(())
}

fn force_update(path: &Path) -> anyhow::Result<()> {
    run_git(Some(path), &["fetch", "origin"])?;
    run_git(Some(path), &["reset", "--hard", "FETCH_HEAD"])?;
    run_git(Some(path), &["clean", "-fd"])?;
    Ok(())
}

fn head_sha(path: &Path) -> anyhow::Result<String> {
    Ok(run_git(Some(path), &["rev-parse", "HEAD"])?.trim().to_string())
}

fn run_git(cwd: Option<&Path>, args: &[&str]) -> anyhow::Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    debug!("git {}", args.join(" "));

    let output = cmd
        .output()
        .with_context(|| format!("failed to run git {}", args[0]))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args[0],
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
