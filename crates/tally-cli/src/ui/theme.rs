//! Colors, badges, and the glyphs used for tree drawing.

use owo_colors::{OwoColorize, Style};

/// Symbol with an ASCII fallback.
#[derive(Debug, Clone, Copy)]
pub struct SymbolPair {
    pub ascii: &'static str,
    pub unicode: &'static str,
}

impl SymbolPair {
    pub const fn new(ascii: &'static str, unicode: &'static str) -> Self {
        Self { ascii, unicode }
    }

    pub fn get(&self, unicode: bool) -> &'static str {
        if unicode {
            self.unicode
        } else {
            self.ascii
        }
    }
}

/// Box-drawing pieces for `account tree`.
pub mod tree {
    use super::SymbolPair;

    pub const BRANCH: SymbolPair = SymbolPair::new("|-- ", "\u{251C}\u{2500}\u{2500} ");
    pub const LAST: SymbolPair = SymbolPair::new("`-- ", "\u{2514}\u{2500}\u{2500} ");
    pub const PIPE: SymbolPair = SymbolPair::new("|   ", "\u{2502}   ");
    pub const SPACE: SymbolPair = SymbolPair::new("    ", "    ");
}

/// Separator used in pretty headers ("Tally · accounts").
pub const HEADER_DOT: SymbolPair = SymbolPair::new("-", "\u{00B7}");

/// Status tokens shown next to results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Err,
    Info,
}

impl Badge {
    pub fn display(&self, unicode: bool) -> &'static str {
        let pair = match self {
            Self::Ok => SymbolPair::new("[OK]", "[\u{2713}]"),
            Self::Warn => SymbolPair::new("[WARN]", "[\u{26A0}]"),
            Self::Err => SymbolPair::new("[ERR]", "[\u{2717}]"),
            Self::Info => SymbolPair::new("[INFO]", "[\u{2139}]"),
        };
        pair.get(unicode)
    }

    pub fn style(&self) -> Style {
        match self {
            Self::Ok => styles::success(),
            Self::Warn => styles::warning(),
            Self::Err => styles::error(),
            Self::Info => styles::info(),
        }
    }
}

pub mod styles {
    use owo_colors::Style;

    pub fn bold() -> Style {
        Style::new().bold()
    }

    pub fn dim() -> Style {
        Style::new().dimmed()
    }

    pub fn success() -> Style {
        Style::new().green()
    }

    pub fn warning() -> Style {
        Style::new().yellow()
    }

    pub fn error() -> Style {
        Style::new().red().bold()
    }

    pub fn info() -> Style {
        Style::new().cyan()
    }
}

/// Apply `style` when color is enabled, otherwise return the text untouched.
pub fn styled(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_display_falls_back_to_ascii() {
        assert_eq!(Badge::Warn.display(false), "[WARN]");
        assert_eq!(Badge::Ok.display(true), "[\u{2713}]");
    }

    #[test]
    fn test_tree_glyphs_have_equal_width() {
        for unicode in [false, true] {
            let widths: Vec<usize> = [tree::BRANCH, tree::LAST, tree::PIPE, tree::SPACE]
                .iter()
                .map(|s| s.get(unicode).chars().count())
                .collect();
            assert!(widths.iter().all(|&w| w == 4), "{:?}", widths);
        }
    }

    #[test]
    fn test_styled_without_color_is_plain() {
        assert_eq!(styled("Checking", styles::bold(), false), "Checking");
        assert_ne!(styled("Checking", styles::bold(), true), "Checking");
    }
}
