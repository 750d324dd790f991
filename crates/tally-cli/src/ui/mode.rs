//! Output mode routing.

use std::str::FromStr;

/// Value of a `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Plain,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "plain" => Ok(Self::Plain),
            other => Err(format!(
                "Unknown format '{}'. Use: table or plain",
                other
            )),
        }
    }
}

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// JSON document on stdout, nothing else
    Json,
    /// `key=value` lines, stable for scripts
    #[default]
    Plain,
    /// Colors, tables, and hints for a terminal
    Pretty,
}

impl OutputMode {
    /// `--json` wins, then `--format plain`, then `TERM=dumb`; otherwise
    /// pretty on a TTY and plain elsewhere.
    pub fn resolve(
        json_flag: bool,
        format: Option<OutputFormat>,
        is_tty: bool,
        term_is_dumb: bool,
    ) -> Self {
        if json_flag {
            return Self::Json;
        }
        if format == Some(OutputFormat::Plain) || term_is_dumb || !is_tty {
            return Self::Plain;
        }
        Self::Pretty
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}
