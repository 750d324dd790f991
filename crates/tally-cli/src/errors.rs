//! User-facing errors with exit codes and hints.

use std::fmt;

use tally_core::{ConstraintKind, TallyError};

use crate::constants::exit_codes;
use crate::ui::render::print_error;
use crate::ui::UiContext;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::new(exit_codes::NOT_FOUND, message).with_hint(hint)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(exit_codes::INVALID_INPUT, message)
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(exit_codes::INTEGRITY_FAILED, message)
    }

    /// Classify an error coming out of a command handler.
    ///
    /// The first `CliError` or `TallyError` in the cause chain decides the
    /// exit code; anything else exits with 1.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(cli) = cause.downcast_ref::<CliError>() {
                return Self {
                    code: cli.code,
                    message: cli.message.clone(),
                    hint: cli.hint.clone(),
                };
            }
            if let Some(core) = cause.downcast_ref::<TallyError>() {
                return Self::from_core(core);
            }
        }
        Self::new(exit_codes::GENERAL, format!("{:#}", err))
    }

    fn from_core(err: &TallyError) -> Self {
        let message = err.to_string();
        match err {
            TallyError::NotFound(_) => Self::new(exit_codes::NOT_FOUND, message),
            TallyError::Validation(_) => Self::new(exit_codes::INVALID_INPUT, message),
            TallyError::Integrity(_) => Self::new(exit_codes::INTEGRITY_FAILED, message)
                .with_hint("Run `tally check` for a full report"),
            TallyError::Constraint { kind, .. } => {
                let error = Self::new(exit_codes::CONSTRAINT, message);
                match constraint_hint(*kind) {
                    Some(hint) => error.with_hint(hint),
                    None => error,
                }
            }
            TallyError::DuplicateFileHash { .. } => Self::new(exit_codes::CONSTRAINT, message)
                .with_hint("This file was already imported; see `tally statement list --all`"),
            TallyError::AccountHasChildren(_) => Self::new(exit_codes::CONSTRAINT, message)
                .with_hint("Delete or move its child accounts first, or close it instead"),
            TallyError::AccountHasStatements(_) => Self::new(exit_codes::CONSTRAINT, message)
                .with_hint("Accounts with statements can be closed with `tally account close`"),
            TallyError::StatementCycle { .. } => Self::new(exit_codes::CONSTRAINT, message),
            TallyError::ImportCleanup { error, .. } => {
                let inner = Self::from_core(error);
                Self {
                    message,
                    ..inner
                }
            }
            TallyError::Storage(_) | TallyError::Migration(_) | TallyError::Io(_) => {
                Self::new(exit_codes::GENERAL, message)
            }
        }
    }

    /// Print to stderr and terminate with this error's code.
    pub fn exit(self, ui: &UiContext) -> ! {
        print_error(ui, &self.message, self.hint.as_deref());
        std::process::exit(self.code)
    }
}

fn constraint_hint(kind: ConstraintKind) -> Option<&'static str> {
    match kind {
        ConstraintKind::Unique | ConstraintKind::PrimaryKey => {
            Some("A record with the same name or file already exists")
        }
        ConstraintKind::ForeignKey => Some("The referenced account or statement does not exist"),
        ConstraintKind::Check => Some("A value is outside its allowed range"),
        ConstraintKind::NotNull => Some("A required value is missing"),
        ConstraintKind::Other => None,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let cases = [
            (TallyError::NotFound("account x".into()), exit_codes::NOT_FOUND),
            (TallyError::Validation("bad".into()), exit_codes::INVALID_INPUT),
            (TallyError::Integrity("loop".into()), exit_codes::INTEGRITY_FAILED),
            (
                TallyError::AccountHasChildren(Uuid::nil()),
                exit_codes::CONSTRAINT,
            ),
            (
                TallyError::DuplicateFileHash {
                    hash: "abc".into(),
                    path: PathBuf::from("/d/abc.pdf"),
                },
                exit_codes::CONSTRAINT,
            ),
            (TallyError::Storage("disk".into()), exit_codes::GENERAL),
        ];
        for (err, code) in cases {
            let mapped = CliError::from_anyhow(&anyhow::Error::new(err));
            assert_eq!(mapped.code, code, "{}", mapped.message);
        }
    }

    #[test]
    fn test_constraint_kind_sets_hint() {
        let err = TallyError::Constraint {
            kind: ConstraintKind::Unique,
            message: "UNIQUE constraint failed: accounts.parent_id, accounts.name".into(),
        };
        let mapped = CliError::from_anyhow(&anyhow::Error::new(err));
        assert_eq!(mapped.code, exit_codes::CONSTRAINT);
        assert!(mapped.hint.unwrap().contains("already exists"));
    }

    #[test]
    fn test_context_does_not_hide_core_error() {
        let err = anyhow::Error::new(TallyError::NotFound("statement 1".into()))
            .context("Failed to show history");
        assert_eq!(CliError::from_anyhow(&err).code, exit_codes::NOT_FOUND);
    }

    #[test]
    fn test_cli_error_passes_through() {
        let err: anyhow::Error = CliError::invalid_input("Invalid date").into();
        let mapped = CliError::from_anyhow(&err);
        assert_eq!(mapped.code, exit_codes::INVALID_INPUT);
        assert_eq!(mapped.message, "Invalid date");
    }

    #[test]
    fn test_unknown_errors_are_general() {
        let err = anyhow::anyhow!("something odd");
        assert_eq!(CliError::from_anyhow(&err).code, exit_codes::GENERAL);
    }
}
