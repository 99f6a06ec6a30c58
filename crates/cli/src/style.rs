//! Shared styling utilities for terminal output.
//!
//! Color is decided once, from config and `--no-color`, and carried by the
//! [`Painter`] rather than toggled globally.

use console::Style;

/// Applies styles when color is enabled, plain text otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    fn paint(&self, style: Style, msg: &str) -> String {
        let style = if self.color {
            style
        } else {
            style.force_styling(false)
        };
        style.apply_to(msg).to_string()
    }

    /// Create a success-styled string (green with checkmark).
    pub fn success(&self, msg: &str) -> String {
        format!("{} {}", self.paint(Style::new().green(), "✓"), msg)
    }

    /// Create an error-styled string (red with cross).
    pub fn error(&self, msg: &str) -> String {
        format!("{} {}", self.paint(Style::new().red(), "✗"), msg)
    }

    /// Create a warning-styled string (yellow).
    pub fn warn(&self, msg: &str) -> String {
        format!("{} {}", self.paint(Style::new().yellow(), "⚠"), msg)
    }

    /// Create a header-styled string (bold).
    pub fn header(&self, msg: &str) -> String {
        self.paint(Style::new().bold(), msg)
    }

    /// Create a dim-styled string.
    pub fn dim(&self, msg: &str) -> String {
        self.paint(Style::new().dim(), msg)
    }

    /// Abbreviated commit hash (yellow).
    pub fn hash(&self, msg: &str) -> String {
        self.paint(Style::new().yellow(), msg)
    }

    /// A shell command the user may want to copy (cyan).
    pub fn command(&self, msg: &str) -> String {
        self.paint(Style::new().cyan(), msg)
    }

    /// One line of a unified diff, colored by its leading character.
    pub fn diff_line(&self, line: &str) -> String {
        if line.starts_with("+++") || line.starts_with("---") {
            self.paint(Style::new().bold(), line)
        } else if line.starts_with('+') {
            self.paint(Style::new().green(), line)
        } else if line.starts_with('-') {
            self.paint(Style::new().red(), line)
        } else if line.starts_with("@@") {
            self.paint(Style::new().cyan(), line)
        } else {
            line.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_painter_emits_no_escapes() {
        let painter = Painter::new(false);
        assert_eq!(painter.success("done"), "✓ done");
        assert_eq!(painter.header("Title"), "Title");
        assert_eq!(painter.diff_line("+added"), "+added");
        assert!(!painter.warn("careful").contains('\u{1b}'));
    }
}
