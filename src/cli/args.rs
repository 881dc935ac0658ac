//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// vt - Vulnerable target environments on demand.
#[derive(Debug, Parser)]
#[command(name = "vt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Path to config file (overrides ~/.vt/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Template corpus directory
    #[arg(long, global = true, value_name = "DIR")]
    pub templates_path: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a template's environment on a provider
    Start(TargetArgs),

    /// Stop a template's environment
    Stop(TargetArgs),

    /// Show whether a template's environment is running
    Status(TargetArgs),

    /// List available templates
    List(ListArgs),

    /// Show details of a template
    Info(InfoArgs),

    /// Fetch or update the template corpus
    Sync(SyncArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments selecting a template and provider.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Template ID of the vulnerable environment
    #[arg(long)]
    pub id: String,

    /// Provider to run the environment on (default: docker-compose)
    #[arg(short, long)]
    pub provider: Option<String>,
}

impl TargetArgs {
    /// The requested provider, or `default` when none was given.
    pub fn provider_or(&self, default: &str) -> String {
        self.provider
            .clone()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Only show templates with a tag containing this text
    #[arg(short, long)]
    pub tag: Option<String>,
}

/// Arguments for the `info` command.
#[derive(Debug, Clone, clap::Args)]
pub struct InfoArgs {
    /// Template ID to describe
    #[arg(long)]
    pub id: String,
}

/// Arguments for the `sync` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SyncArgs {
    /// Discard local changes in the corpus
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
