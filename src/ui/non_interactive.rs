//! Non-interactive UI for CI/headless environments.

use super::theme::VtTheme;
use super::{OutputMode, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Spinners become a single line when started and another when finished,
/// which keeps log-based environments readable.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: VtTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: VtTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        let visible = self.mode.shows_spinners();
        if visible {
            println!("  {}", message);
        }
        Box::new(LineSpinner {
            visible,
            theme: self.theme.clone(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  {}", hint);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints its final status as a plain line.
struct LineSpinner {
    visible: bool,
    theme: VtTheme,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.visible {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.visible {
            println!("{}", self.theme.format_skipped(msg));
        }
    }
}
