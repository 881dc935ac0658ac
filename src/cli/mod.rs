//! Command-line interface for vt.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, InfoArgs, ListArgs, SyncArgs, TargetArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
