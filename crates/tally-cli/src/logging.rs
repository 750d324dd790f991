//! Diagnostic logging to stderr.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const CRATES: [&str; 2] = ["tally", "tally_core"];
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Filter directives for this run.
///
/// `-v` flags win, then `--quiet`, then `RUST_LOG`, then `[log] level` from
/// the config, then `warn`.
pub fn filter_directives(
    verbose: u8,
    quiet: bool,
    rust_log: Option<&str>,
    configured: Option<&str>,
) -> String {
    let rust_log = rust_log.map(str::trim).filter(|v| !v.is_empty());
    let configured = configured.map(str::trim).filter(|v| !v.is_empty());

    match verbose {
        0 => {}
        1 => return for_crates("info"),
        2 => return for_crates("debug"),
        _ => return for_crates("trace"),
    }
    if quiet {
        return for_crates("error");
    }
    if let Some(directives) = rust_log {
        return directives.to_string();
    }
    match configured {
        Some(level) if LEVELS.contains(&level.to_ascii_lowercase().as_str()) => {
            for_crates(&level.to_ascii_lowercase())
        }
        Some(directives) => directives.to_string(),
        None => for_crates("warn"),
    }
}

fn for_crates(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber once. Output goes to stderr so stdout
/// stays clean for JSON and plain output.
pub fn init_logging(verbose: u8, quiet: bool, configured: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let directives = filter_directives(verbose, quiet, rust_log.as_deref(), configured);
        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| {
            EnvFilter::new(for_crates("warn"))
        });

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_warn() {
        assert_eq!(filter_directives(0, false, None, None), "tally=warn,tally_core=warn");
    }

    #[test]
    fn test_verbose_beats_everything() {
        assert_eq!(
            filter_directives(1, true, Some("trace"), Some("error")),
            "tally=info,tally_core=info"
        );
        assert_eq!(
            filter_directives(2, false, None, None),
            "tally=debug,tally_core=debug"
        );
        assert_eq!(
            filter_directives(5, false, None, None),
            "tally=trace,tally_core=trace"
        );
    }

    #[test]
    fn test_rust_log_beats_config() {
        assert_eq!(
            filter_directives(0, false, Some("tally_core=debug"), Some("info")),
            "tally_core=debug"
        );
        assert_eq!(
            filter_directives(0, false, Some("  "), Some("info")),
            "tally=info,tally_core=info"
        );
    }

    #[test]
    fn test_quiet_only_errors() {
        assert_eq!(
            filter_directives(0, true, Some("debug"), None),
            "tally=error,tally_core=error"
        );
    }

    #[test]
    fn test_config_directive_passes_through() {
        assert_eq!(
            filter_directives(0, false, None, Some("tally_core=trace")),
            "tally_core=trace"
        );
        assert_eq!(
            filter_directives(0, false, None, Some("DEBUG")),
            "tally=debug,tally_core=debug"
        );
    }
}
