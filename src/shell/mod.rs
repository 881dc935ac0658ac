//! External process execution and platform detection.

pub mod command;
pub mod platform;

pub use command::{
    execute, execute_check, execute_streaming, CommandOptions, CommandResult, OutputCallback,
    OutputLine,
};
pub use platform::is_ci;
