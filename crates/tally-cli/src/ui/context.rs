//! Terminal detection for output decisions.

use std::io::IsTerminal;

use super::mode::{OutputFormat, OutputMode};

const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone)]
pub struct UiContext {
    /// stdout is a terminal
    pub is_tty: bool,
    pub color: bool,
    pub unicode: bool,
    /// Terminal columns
    pub width: usize,
    pub mode: OutputMode,
}

impl UiContext {
    /// Build a context from the environment and the global output flags.
    ///
    /// Color is off for `--no-color`, `NO_COLOR`, `TERM=dumb`, or when stdout
    /// is not a terminal.
    pub fn from_env(
        json_flag: bool,
        format: Option<OutputFormat>,
        no_color_flag: bool,
        ascii_flag: bool,
    ) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").is_ok_and(|v| v == "dumb");
        let no_color_env = std::env::var_os("NO_COLOR").is_some();

        Self {
            is_tty,
            color: is_tty && !no_color_flag && !no_color_env && !term_is_dumb,
            unicode: !ascii_flag,
            width: terminal_width().unwrap_or(DEFAULT_WIDTH),
            mode: OutputMode::resolve(json_flag, format, is_tty, term_is_dumb),
        }
    }

    /// Prompts need both ends attached to a terminal.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && std::io::stdin().is_terminal()
    }
}

fn terminal_width() -> Option<usize> {
    if let Some(width) = std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.trim().parse::<usize>().ok())
        .filter(|&w| w > 0)
    {
        return Some(width);
    }

    #[cfg(unix)]
    {
        let mut size = std::mem::MaybeUninit::<libc::winsize>::uninit();
        // SAFETY: TIOCGWINSZ fills the winsize struct on success.
        let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, size.as_mut_ptr()) };
        if rc == 0 {
            // SAFETY: initialized by the successful ioctl above.
            let size = unsafe { size.assume_init() };
            if size.ws_col > 0 {
                return Some(usize::from(size.ws_col));
            }
        }
    }

    None
}
