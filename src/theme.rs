//! ANSI color helpers and CLI text formatting

/// ANSI color codes for CLI output
pub mod ansi {
    /// Gray color (ANSI 37) - used for descriptions
    pub const GRAY: &str = "\x1b[37m";
    /// Light green (ANSI 92) - used for accent/success
    pub const GREEN: &str = "\x1b[92m";
    /// Red color (ANSI 31) - used for errors
    pub const RED: &str = "\x1b[31m";
    /// Dark gray (ANSI 90) - used for secondary text
    pub const DARK_GRAY: &str = "\x1b[90m";
    /// Reset color
    pub const RESET: &str = "\x1b[0m";
}

/// CLI text styling. Colors are dropped when disabled.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    color: bool,
}

/// Theme for the current process.
///
/// Colors are on for terminals unless `NO_COLOR` is set; `FORCE_COLOR` wins over both.
pub fn current_theme() -> Theme {
    let forced = std::env::var_os("FORCE_COLOR").is_some();
    let disabled = std::env::var_os("NO_COLOR").is_some();
    Theme {
        color: forced || (!disabled && atty::is(atty::Stream::Stdout)),
    }
}

impl Theme {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, ansi::RESET)
        } else {
            text.to_string()
        }
    }

    /// Format text with the accent color.
    pub fn accent_text(&self, text: &str) -> String {
        self.paint(ansi::GREEN, text)
    }

    /// Format text with the primary color.
    pub fn primary_text(&self, text: &str) -> String {
        self.paint(ansi::GRAY, text)
    }

    /// Format text with the secondary color.
    pub fn secondary_text(&self, text: &str) -> String {
        self.paint(ansi::DARK_GRAY, text)
    }

    /// Format text with the error color.
    pub fn error_text(&self, text: &str) -> String {
        self.paint(ansi::RED, text)
    }

    /// Format text with the success color.
    pub fn success_text(&self, text: &str) -> String {
        self.paint(ansi::GREEN, text)
    }
}
