//! Constants used throughout the CLI.

/// Process exit codes.
///
/// 0 is success, 1 is any unclassified failure, 2 is left to clap for usage
/// errors.
pub mod exit_codes {
    pub const GENERAL: i32 = 1;

    /// Data directory, database, account, statement, or file missing.
    pub const NOT_FOUND: i32 = 3;

    /// Bad arguments or values rejected before touching the database.
    pub const INVALID_INPUT: i32 = 4;

    /// `tally check` found problems, or stored data is inconsistent.
    pub const INTEGRITY_FAILED: i32 = 6;

    /// The database refused a write (duplicate, dangling reference, guard).
    pub const CONSTRAINT: i32 = 7;
}

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TALLY_CONFIG";
