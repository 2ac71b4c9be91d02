//! Terminal styling for text output.
//!
//! Colors are plain ANSI escape sequences, dropped entirely when the
//! terminal does not want them (`NO_COLOR`, `TERM=dumb`).

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    /// Gray for secondary elements (commands, paths).
    pub const GRAY: &str = "\x1b[90m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
}

/// Resolved color codes, either ANSI sequences or empty strings when color
/// is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub bold: &'static str,
    pub muted: &'static str,
    pub ok: &'static str,
    pub warn: &'static str,
    pub error: &'static str,
}

impl ColorPalette {
    pub fn colored() -> Self {
        Self {
            reset: colors::RESET,
            bold: colors::BOLD,
            muted: colors::GRAY,
            ok: colors::GREEN,
            warn: colors::YELLOW,
            error: colors::RED,
        }
    }

    pub fn plain() -> Self {
        Self {
            reset: "",
            bold: "",
            muted: "",
            ok: "",
            warn: "",
            error: "",
        }
    }

    /// Palette for the current terminal.
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

/// Check whether ANSI colors should be used.
///
/// Respects the `NO_COLOR` convention and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}
