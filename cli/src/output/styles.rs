//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

use crate::domain::InstallState;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages (green)
    pub success: Style,
    /// Warning messages (yellow)
    pub warning: Style,
    /// Error messages (red)
    pub error: Style,
    /// Info messages (blue)
    pub info: Style,
    /// Dimmed/secondary text
    pub dim: Style,
    /// Headers/section titles
    pub header: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }

    /// Style for an install state in listings.
    #[must_use]
    pub fn state(&self, state: InstallState) -> Style {
        match state {
            InstallState::Success => self.success,
            InstallState::Error => self.error,
            InstallState::Deleting | InstallState::Deleted => self.dim,
            _ => self.warning,
        }
    }
}
