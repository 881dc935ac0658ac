//! Info command implementation.

use crate::app::App;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The info command implementation.
pub struct InfoCommand<'a> {
    app: &'a App,
    id: String,
}

impl<'a> InfoCommand<'a> {
    /// Create a new info command.
    pub fn new(app: &'a App, id: &str) -> Self {
        Self {
            app,
            id: id.to_string(),
        }
    }
}

impl Command for InfoCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match self.app.template(&self.id) {
            Ok(template) => {
                ui.message(&template.render_details());
                Ok(CommandResult::success())
            }
            Err(e) => {
                ui.error(&e.to_string());
                ui.show_hint("Run `vt list` to see available templates");
                Ok(CommandResult::failure(1))
            }
        }
    }
}
