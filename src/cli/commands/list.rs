//! List command implementation.
//!
//! The `vt list` command shows discovered templates as a table sorted by ID,
//! optionally narrowed to those with a tag containing the given text.

use crate::app::App;
use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand<'a> {
    app: &'a App,
    args: ListArgs,
}

impl<'a> ListCommand<'a> {
    /// Create a new list command.
    pub fn new(app: &'a App, args: ListArgs) -> Self {
        Self { app, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let templates = match self.args.tag.as_deref() {
            Some(tag) => self.app.templates().filter_by_tag(tag),
            None => self.app.templates().templates_sorted(),
        };

        if templates.is_empty() {
            match self.args.tag.as_deref() {
                Some(tag) => ui.message(&format!("No templates found with tag '{}'", tag)),
                None => {
                    ui.message("No templates found");
                    ui.show_hint("Run `vt sync` to fetch the template corpus");
                }
            }
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(vec!["ID", "Name", "Author", "Targets", "Type", "Tags"])
            .with_caption(format!("there are {} templates", templates.len()));
        for template in &templates {
            let targets = template.info.targets.join(", ");
            let tags = template.info.tags.join(", ");
            table.add_row(vec![
                template.id.as_str(),
                template.display_name(),
                template.info.author.as_str(),
                targets.as_str(),
                template.info.kind.as_str(),
                tags.as_str(),
            ]);
        }
        ui.show_table(&table);

        Ok(CommandResult::success())
    }
}
