//! Text styling

use crossterm::style::{Color, Stylize};

/// Colours for text reports
///
/// A disabled palette returns its input untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Report title
    pub fn title(&self, s: &str) -> String {
        self.paint(s, Color::DarkCyan)
    }

    /// Section heading
    pub fn section(&self, s: &str) -> String {
        self.paint(s, Color::DarkGreen)
    }

    /// Field label
    pub fn key(&self, s: &str) -> String {
        self.paint(s, Color::DarkYellow)
    }

    pub fn success(&self, s: &str) -> String {
        self.paint(s, Color::DarkGreen)
    }

    pub fn error(&self, s: &str) -> String {
        self.paint(s, Color::DarkRed)
    }

    fn paint(&self, s: &str, color: Color) -> String {
        if self.enabled {
            s.with(color).to_string()
        } else {
            s.to_string()
        }
    }
}
