//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::app::{ensure_corpus, App};
use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;
use crate::template::SyncOutcome;
use crate::ui::{OutputMode, UserInterface};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: AppConfig,
}

impl CommandDispatcher {
    /// Create a new dispatcher with fully resolved configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Get the configuration commands run with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    ///
    /// Commands that need templates load the corpus first, cloning it when
    /// it is missing.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // Apply config default_output when no CLI flag was explicitly set
        if ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(self.config.default_output.into());
        }

        match &cli.command {
            Commands::Sync(args) => {
                let cmd = super::sync::SyncCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Start(args) => {
                let app = self.load_app(ui)?;
                let provider = args.provider_or(&self.config.default_provider);
                let cmd = super::start::StartCommand::new(&app, &args.id, &provider);
                cmd.execute(ui)
            }
            Commands::Stop(args) => {
                let app = self.load_app(ui)?;
                let provider = args.provider_or(&self.config.default_provider);
                let cmd = super::stop::StopCommand::new(&app, &args.id, &provider);
                cmd.execute(ui)
            }
            Commands::Status(args) => {
                let app = self.load_app(ui)?;
                let provider = args.provider_or(&self.config.default_provider);
                let cmd = super::status::StatusCommand::new(&app, &args.id, &provider);
                cmd.execute(ui)
            }
            Commands::List(args) => {
                let app = self.load_app(ui)?;
                let cmd = super::list::ListCommand::new(&app, args.clone());
                cmd.execute(ui)
            }
            Commands::Info(args) => {
                let app = self.load_app(ui)?;
                let cmd = super::info::InfoCommand::new(&app, &args.id);
                cmd.execute(ui)
            }
        }
    }

    fn load_app(&self, ui: &mut dyn UserInterface) -> Result<App> {
        if !self.config.templates_path.exists() {
            let mut spinner = ui.start_spinner("Fetching template corpus...");
            match ensure_corpus(&self.config) {
                Ok(Some(SyncOutcome::Cloned { commit_sha })) => {
                    spinner.finish_success(&format!("Templates cloned at {}", short_sha(&commit_sha)));
                }
                Ok(_) => spinner.finish_skipped("Templates already present"),
                Err(e) => {
                    spinner.finish_error("Could not fetch templates");
                    return Err(e);
                }
            }
        }
        App::load(&self.config)
    }
}

/// First seven characters of a commit hash.
pub(crate) fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{CompletionsArgs, ListArgs};
    use crate::ui::MockUI;
    use clap_complete::Shell;
    use std::fs;
    use tempfile::TempDir;

    fn cli(command: Commands) -> Cli {
        Cli {
            config: None,
            templates_path: None,
            verbose: false,
            quiet: false,
            no_color: false,
            debug: false,
            command,
        }
    }

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn short_sha_truncates() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[test]
    fn dispatches_list_against_configured_corpus() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("web").join("sqli-basic");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.yaml"), "id: sqli-basic\n").unwrap();

        let dispatcher = CommandDispatcher::new(AppConfig {
            templates_path: temp.path().to_path_buf(),
            ..AppConfig::default()
        });
        let mut ui = MockUI::new();

        let result = dispatcher
            .dispatch(&cli(Commands::List(ListArgs::default())), &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("sqli-basic"));
    }

    #[test]
    fn missing_corpus_that_cannot_be_cloned_fails() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(AppConfig {
            templates_path: temp.path().join("absent"),
            remote_repository: "/nonexistent/corpus.git".to_string(),
            ..AppConfig::default()
        });
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli(Commands::List(ListArgs::default())), &mut ui);

        assert!(result.is_err());
        assert_eq!(ui.spinners(), &["Fetching template corpus..."]);
    }

    #[test]
    fn config_output_mode_applies_to_normal_ui() {
        let dispatcher = CommandDispatcher::new(AppConfig {
            default_output: crate::config::OutputMode::Quiet,
            ..AppConfig::default()
        });
        let mut ui = MockUI::new();

        dispatcher
            .dispatch(
                &cli(Commands::Completions(CompletionsArgs { shell: Shell::Bash })),
                &mut ui,
            )
            .unwrap();

        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
