//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! template corpus for the commands that need it and routes each
//! subcommand (`vt start`, `vt list`, ...) to its implementation.

pub mod completions;
pub mod dispatcher;
pub mod info;
pub mod list;
pub mod start;
pub mod status;
pub mod stop;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
