//! Stop command implementation.

use crate::app::App;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The stop command implementation.
pub struct StopCommand<'a> {
    app: &'a App,
    id: String,
    provider: String,
}

impl<'a> StopCommand<'a> {
    /// Create a new stop command.
    pub fn new(app: &'a App, id: &str, provider: &str) -> Self {
        Self {
            app,
            id: id.to_string(),
            provider: provider.to_string(),
        }
    }
}

impl Command for StopCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut spinner = ui.start_spinner(&format!(
            "Stopping {} on {}...",
            self.id, self.provider
        ));

        match self.app.stop(&self.id, &self.provider) {
            Ok(()) => {
                spinner.finish_success(&format!(
                    "{} template stopped on {}",
                    self.id, self.provider
                ));
                Ok(CommandResult::success())
            }
            Err(e) => {
                spinner.finish_error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
        }
    }
}
