//! Error types for Tally core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps them
//! to user-facing messages and exit codes.

use std::path::PathBuf;

use rusqlite::ffi;
use thiserror::Error;
use uuid::Uuid;

use crate::migration::MigrationError;

/// Result type alias for Tally operations.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Which declarative constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    PrimaryKey,
    ForeignKey,
    Check,
    NotNull,
    Other,
}

impl ConstraintKind {
    fn from_extended_code(code: i32) -> Self {
        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => Self::Unique,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::PrimaryKey,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ForeignKey,
            ffi::SQLITE_CONSTRAINT_CHECK => Self::Check,
            ffi::SQLITE_CONSTRAINT_NOTNULL => Self::NotNull,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::PrimaryKey => "primary key",
            Self::ForeignKey => "foreign key",
            Self::Check => "check",
            Self::NotNull => "not null",
            Self::Other => "constraint",
        }
    }
}

/// Core error type for Tally operations.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// A declarative schema constraint rejected the write
    #[error("Constraint violation ({}): {message}", kind.as_str())]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Account still has child accounts
    #[error("Account {0} has child accounts")]
    AccountHasChildren(Uuid),

    /// Account is still referenced by statements
    #[error("Account {0} is referenced by statements")]
    AccountHasStatements(Uuid),

    /// Superseding would create a cycle of replacements
    #[error("Statement {old} cannot be replaced by {new}: replacement chain would cycle")]
    StatementCycle { old: Uuid, new: Uuid },

    /// A statement with the same content was already imported
    #[error("Statement file with hash {hash} already exists at {}", path.display())]
    DuplicateFileHash { hash: String, path: PathBuf },

    /// Recording an import failed and the copied file could not be removed
    #[error("{error} (and failed to remove {}: {cleanup})", path.display())]
    ImportCleanup {
        error: Box<TallyError>,
        path: PathBuf,
        cleanup: std::io::Error,
    },

    /// Stored data violates an invariant
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Schema migration failure
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TallyError {
    /// The constraint kind, if this error came from a rejected write.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for TallyError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                TallyError::Constraint {
                    kind: ConstraintKind::from_extended_code(failure.extended_code),
                    message: message.clone().unwrap_or_else(|| err.to_string()),
                }
            }
            other => TallyError::Storage(format!("SQLite error: {}", other)),
        }
    }
}
