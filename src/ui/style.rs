use crate::storage::Theme;
use console::{Style, style};
use std::fmt::Display;

/// Dim: secondary text, separators
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// White bold: section headers
pub fn header<D: Display>(text: D) -> String {
    style(text).bold().to_string()
}

/// Colours for one theme. Light terminals get darker hues.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    theme: Theme,
}

impl Palette {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(self) -> Theme {
        self.theme
    }

    fn pick(self, light: Style, dark: Style) -> Style {
        match self.theme {
            Theme::Light => light,
            Theme::Dark => dark,
        }
    }

    /// Speaker label for user turns
    pub fn user_label(self) -> String {
        self.pick(Style::new().blue().bold(), Style::new().cyan().bold())
            .apply_to("you")
            .to_string()
    }

    /// Speaker label for assistant turns
    pub fn assistant_label(self) -> String {
        self.pick(Style::new().magenta().bold(), Style::new().green().bold())
            .apply_to("assistant")
            .to_string()
    }

    pub fn error<D: Display>(self, text: D) -> String {
        Style::new().red().bold().apply_to(text).to_string()
    }

    pub fn notice<D: Display>(self, text: D) -> String {
        self.pick(Style::new().black().dim(), Style::new().yellow())
            .apply_to(text)
            .to_string()
    }

    /// Confirmed values, selected model
    pub fn value<D: Display>(self, text: D) -> String {
        self.pick(Style::new().green(), Style::new().green().bright())
            .apply_to(text)
            .to_string()
    }

    pub fn prompt(self) -> String {
        self.pick(Style::new().blue(), Style::new().cyan())
            .apply_to("› ")
            .to_string()
    }
}
