//! Start command implementation.
//!
//! The `vt start` command brings a template's environment up and prints
//! its post-installation instructions.

use crate::app::App;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The start command implementation.
pub struct StartCommand<'a> {
    app: &'a App,
    id: String,
    provider: String,
}

impl<'a> StartCommand<'a> {
    /// Create a new start command.
    pub fn new(app: &'a App, id: &str, provider: &str) -> Self {
        Self {
            app,
            id: id.to_string(),
            provider: provider.to_string(),
        }
    }
}

impl Command for StartCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut spinner = ui.start_spinner(&format!(
            "Starting {} on {}...",
            self.id, self.provider
        ));

        let template = match self.app.start(&self.id, &self.provider) {
            Ok(template) => template,
            Err(e) => {
                spinner.finish_error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };
        spinner.finish_success(&format!(
            "{} template is running on {}",
            self.id, self.provider
        ));

        if !template.post_install.is_empty() {
            ui.show_header("Post-installation instructions");
            for instruction in &template.post_install {
                ui.message(&format!("  {}", instruction));
            }
        }

        Ok(CommandResult::success())
    }
}
