//! Storage trait definition.
//!
//! `LedgerStore` is the seam between the domain (accounts, statements) and
//! the backend that persists it. The SQLite backend is the only one today.

use uuid::Uuid;

use super::types::{Account, AccountFilter, NewAccount, NewStatement, Statement, StatementFilter};
use crate::error::Result;
use crate::migration::MigrationStatus;

/// Persistence interface for the chart of accounts and the statement register.
///
/// Implementations must ensure:
/// - The schema is fully migrated before the store is handed out
/// - Foreign keys are enforced
/// - UUIDs are used for all identifiers
pub trait LedgerStore: Send + Sync {
    // --- Account operations ---

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Constraint` with `ConstraintKind::Unique` when a
    /// sibling already has this name, or `ConstraintKind::ForeignKey` when the
    /// parent does not exist.
    fn create_account(&mut self, account: &NewAccount) -> Result<Account>;

    /// Get an account by ID.
    ///
    /// Returns `Ok(None)` if not found.
    fn get_account(&self, id: &Uuid) -> Result<Option<Account>>;

    /// List accounts matching the filter, ordered by parent, name, then id.
    fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>>;

    /// Change an account's display name.
    fn rename_account(&mut self, id: &Uuid, name: &str) -> Result<Account>;

    /// Mark an account as closed.
    fn close_account(&mut self, id: &Uuid) -> Result<Account>;

    /// Clear the closed flag.
    fn reopen_account(&mut self, id: &Uuid) -> Result<Account>;

    /// Remove an account.
    ///
    /// # Errors
    ///
    /// - `TallyError::NotFound` if the account does not exist
    /// - `TallyError::AccountHasChildren` if any account names it as parent
    /// - `TallyError::AccountHasStatements` if statements reference it
    fn delete_account(&mut self, id: &Uuid) -> Result<()>;

    // --- Statement operations ---

    /// Insert a new statement record.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Constraint` with `ConstraintKind::Unique` when the
    /// file hash was already imported.
    fn create_statement(&mut self, statement: &NewStatement) -> Result<Statement>;

    /// Insert `statement` and mark `replaces` as replaced by it, atomically.
    ///
    /// Nothing is written unless both steps succeed. Errors are those of
    /// `create_statement` and `supersede_statement`.
    fn create_replacement(&mut self, statement: &NewStatement, replaces: &Uuid) -> Result<Statement>;

    fn get_statement(&self, id: &Uuid) -> Result<Option<Statement>>;

    /// Look up a statement by content hash.
    fn find_statement_by_hash(&self, file_hash: &str) -> Result<Option<Statement>>;

    /// List statements matching the filter, oldest import first.
    fn list_statements(&self, filter: &StatementFilter) -> Result<Vec<Statement>>;

    /// Record that `new` replaces `old`.
    ///
    /// # Errors
    ///
    /// - `TallyError::NotFound` if either statement does not exist
    /// - `TallyError::Validation` if `old` is already superseded or `old == new`
    /// - `TallyError::StatementCycle` if the link would close a cycle
    fn supersede_statement(&mut self, old: &Uuid, new: &Uuid) -> Result<Statement>;

    // --- Maintenance operations ---

    /// Verify referential and structural integrity of the stored data.
    ///
    /// Returns `Ok(())` if the store is valid, or `TallyError::Integrity`
    /// describing every problem found.
    fn check_integrity(&self) -> Result<()>;

    /// Highest applied migration version, or 0 for an empty database.
    fn schema_version(&self) -> Result<u32>;

    /// Every known migration paired with when it was applied.
    fn migration_status(&self) -> Result<Vec<MigrationStatus>>;
}
