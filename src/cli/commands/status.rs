//! Status command implementation.
//!
//! The `vt status` command reports whether a template's environment is
//! running. It exits non-zero when the environment is stopped so scripts
//! can poll it.

use crate::app::App;
use crate::error::Result;
use crate::provider::ProviderStatus;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Exit code reported when the environment is not running.
pub const STOPPED_EXIT_CODE: i32 = 3;

/// The status command implementation.
pub struct StatusCommand<'a> {
    app: &'a App,
    id: String,
    provider: String,
}

impl<'a> StatusCommand<'a> {
    /// Create a new status command.
    pub fn new(app: &'a App, id: &str, provider: &str) -> Self {
        Self {
            app,
            id: id.to_string(),
            provider: provider.to_string(),
        }
    }
}

impl Command for StatusCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let status = match self.app.status(&self.id, &self.provider) {
            Ok(status) => status,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        match status {
            ProviderStatus::Up => {
                ui.success(&format!("{} is running on {}", self.id, self.provider));
                Ok(CommandResult::success())
            }
            ProviderStatus::Down => {
                ui.message(&format!("{} is stopped on {}", self.id, self.provider));
                ui.show_hint(&format!("Run `vt start --id {}` to start it", self.id));
                Ok(CommandResult::failure(STOPPED_EXIT_CODE))
            }
        }
    }
}
