//! Sync command implementation.
//!
//! The `vt sync` command clones the template corpus or brings an existing
//! checkout up to date. Local edits block the update unless `--force`.

use crate::cli::args::SyncArgs;
use crate::config::AppConfig;
use crate::error::{Result, VtError};
use crate::template::{CorpusSync, SyncOutcome};
use crate::ui::UserInterface;

use super::dispatcher::{short_sha, Command, CommandResult};

/// The sync command implementation.
pub struct SyncCommand {
    config: AppConfig,
    args: SyncArgs,
}

impl SyncCommand {
    /// Create a new sync command.
    pub fn new(config: &AppConfig, args: SyncArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }
}

impl Command for SyncCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let path = &self.config.templates_path;
        let mut spinner = ui.start_spinner(&format!("Syncing templates into {}...", path.display()));

        let syncer = CorpusSync::new(self.config.remote_repository.as_str());
        match syncer.sync(path, self.args.force) {
            Ok(SyncOutcome::Cloned { commit_sha }) => {
                spinner.finish_success(&format!(
                    "Cloned {} at {}",
                    syncer.remote(),
                    short_sha(&commit_sha)
                ));
            }
            Ok(SyncOutcome::Updated { from, to }) => {
                spinner.finish_success(&format!(
                    "Updated templates {}..{}",
                    short_sha(&from),
                    short_sha(&to)
                ));
            }
            Ok(SyncOutcome::UpToDate { commit_sha }) => {
                spinner.finish_skipped(&format!(
                    "Templates already up to date at {}",
                    short_sha(&commit_sha)
                ));
            }
            Err(e @ VtError::DirtyCorpus { .. }) => {
                spinner.finish_error(&e.to_string());
                ui.show_hint("Run `vt sync --force` to discard local changes");
                return Ok(CommandResult::failure(1));
            }
            Err(e) => {
                spinner.finish_error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        }

        Ok(CommandResult::success())
    }
}
