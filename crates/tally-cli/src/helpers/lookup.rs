//! Resolve user-supplied account and statement references.

use uuid::Uuid;

use tally_core::storage::{Account, AccountFilter, Statement, StatementFilter};
use tally_core::{AccountTree, LedgerStore};

use crate::errors::CliError;

/// Shortest statement ID prefix accepted.
const MIN_PREFIX_LEN: usize = 4;

/// Accept a full UUID or a colon path such as `Assets:Bank:Checking`.
pub fn resolve_account<S: LedgerStore + ?Sized>(
    store: &S,
    reference: &str,
) -> anyhow::Result<Account> {
    let reference = reference.trim();
    if let Ok(id) = Uuid::parse_str(reference) {
        return store
            .get_account(&id)?
            .ok_or_else(|| account_not_found(reference).into());
    }

    let tree = AccountTree::build(store.list_accounts(&AccountFilter::all())?)?;
    tree.find_by_path(reference)
        .cloned()
        .ok_or_else(|| account_not_found(reference).into())
}

fn account_not_found(reference: &str) -> CliError {
    CliError::not_found(
        format!("Account '{}' not found", reference),
        "Run `tally account tree --all` to see account paths",
    )
}

/// Accept a full UUID or an unambiguous prefix of one.
pub fn resolve_statement<S: LedgerStore + ?Sized>(
    store: &S,
    reference: &str,
) -> anyhow::Result<Statement> {
    let reference = reference.trim();
    if let Ok(id) = Uuid::parse_str(reference) {
        return store
            .get_statement(&id)?
            .ok_or_else(|| statement_not_found(reference).into());
    }

    let prefix = reference.to_ascii_lowercase().replace('-', "");
    if prefix.len() < MIN_PREFIX_LEN || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CliError::invalid_input(format!(
            "Invalid statement ID '{}' (use a UUID or at least {} hex digits)",
            reference, MIN_PREFIX_LEN
        ))
        .into());
    }

    let mut matches: Vec<Statement> = store
        .list_statements(&StatementFilter::all())?
        .into_iter()
        .filter(|s| s.id.simple().to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(statement_not_found(reference).into()),
        1 => Ok(matches.remove(0)),
        n => Err(CliError::invalid_input(format!(
            "Statement ID prefix '{}' matches {} statements",
            reference, n
        ))
        .with_hint("Use more characters of the ID")
        .into()),
    }
}

fn statement_not_found(reference: &str) -> CliError {
    CliError::not_found(
        format!("Statement '{}' not found", reference),
        "Run `tally statement list --all` to see statement IDs",
    )
}
