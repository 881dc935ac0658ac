//! Visual theme and styling.

use console::Style;

use crate::provider::ProviderStatus;

/// Terminal styles used by vt.
#[derive(Debug, Clone)]
pub struct VtTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for contextual hints (cyan dim).
    pub hint: Style,
}

impl Default for VtTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl VtTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            hint: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a skipped message (icon + text in dim).
    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("▶"),
            self.highlight.apply_to(title)
        )
    }

    /// Format an environment status word.
    pub fn format_status(&self, status: ProviderStatus) -> String {
        match status {
            ProviderStatus::Up => self.success.apply_to("running").to_string(),
            ProviderStatus::Down => self.dim.apply_to("stopped").to_string(),
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_messages_with_icons() {
        let theme = VtTheme::plain();
        assert_eq!(theme.format_success("Complete"), "✓ Complete");
        assert_eq!(theme.format_warning("Caution"), "⚠ Caution");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
        assert_eq!(theme.format_skipped("Skipped"), "○ Skipped");
    }

    #[test]
    fn theme_formats_header() {
        let theme = VtTheme::plain();
        let msg = theme.format_header("sqli-basic");
        assert!(msg.contains("sqli-basic"));
        assert!(msg.contains("▶"));
    }

    #[test]
    fn theme_formats_status_words() {
        let theme = VtTheme::plain();
        assert_eq!(theme.format_status(ProviderStatus::Up), "running");
        assert_eq!(theme.format_status(ProviderStatus::Down), "stopped");
    }

    #[test]
    fn default_impl_matches_new() {
        let default = VtTheme::default();
        let new = VtTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
