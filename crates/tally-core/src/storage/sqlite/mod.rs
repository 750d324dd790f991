//! SQLite storage backend.
//!
//! The database lives in a single file (or in memory for tests). Opening a
//! store turns on foreign key enforcement and applies the embedded
//! migrations, so every `SqliteStorage` sees the current schema.

mod row;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{ConstraintKind, Result, TallyError};
use crate::hierarchy::{would_cycle, AccountTree, StatementChain};
use crate::migration::{self, Migration, MigrationRunner, MigrationSource, MigrationStatus};
use crate::storage::traits::LedgerStore;
use crate::storage::types::{
    Account, AccountFilter, NewAccount, NewStatement, Statement, StatementFilter,
};

use row::{AccountRow, StatementRow, ACCOUNT_COLUMNS, STATEMENT_COLUMNS};

/// SQLite-backed ledger store.
pub struct SqliteStorage {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, None)
    }

    fn from_connection(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let source = MigrationSource::embedded();
        let migrations = Migration::discover(&source)?;
        let applied = MigrationRunner::new(&mut conn).run(&source, &migrations)?;
        if !applied.is_empty() {
            tracing::debug!(?applied, "database migrated");
        }

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TallyError::Storage("SQLite connection poisoned".to_string()))
    }

    fn update_account<F>(&mut self, id: &Uuid, sql: &str, bind: F) -> Result<Account>
    where
        F: FnOnce(&mut rusqlite::Statement<'_>, &str) -> rusqlite::Result<usize>,
    {
        let conn = self.lock_conn()?;
        let id_str = id.to_string();
        let changed = {
            let mut stmt = conn.prepare(sql)?;
            bind(&mut stmt, &id_str)?
        };
        if changed == 0 {
            return Err(TallyError::NotFound(format!("account {}", id)));
        }
        query_account(&conn, id)?
            .ok_or_else(|| TallyError::NotFound(format!("account {}", id)))
    }
}

fn validate_account_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TallyError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }
    if name.contains(':') {
        return Err(TallyError::Validation(format!(
            "Account name '{}' cannot contain ':'",
            name
        )));
    }
    Ok(())
}

fn validate_currency(currency: &str) -> Result<()> {
    if currency.trim().is_empty() {
        return Err(TallyError::Validation("Currency cannot be empty".to_string()));
    }
    Ok(())
}

fn query_account(conn: &Connection, id: &Uuid) -> Result<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS);
    let row = conn
        .query_row(&sql, [id.to_string()], AccountRow::from_row)
        .optional()?;
    row.map(Account::try_from).transpose()
}

fn query_statement(conn: &Connection, id: &Uuid) -> Result<Option<Statement>> {
    let sql = format!("SELECT {} FROM statements WHERE id = ?1", STATEMENT_COLUMNS);
    let row = conn
        .query_row(&sql, [id.to_string()], StatementRow::from_row)
        .optional()?;
    row.map(Statement::try_from).transpose()
}

/// Root accounts share no parent, so `UNIQUE(parent_id, name)` cannot see
/// clashes between them. Rows migrated from the flat schema may already
/// share a name; only new names are checked.
fn ensure_root_name_free(conn: &Connection, name: &str, except: Option<&Uuid>) -> Result<()> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE parent_id IS NULL AND name = ?1 AND id != ?2)",
        params![name, except.map(|id| id.to_string()).unwrap_or_default()],
        |row| row.get(0),
    )?;
    if taken {
        return Err(TallyError::Constraint {
            kind: ConstraintKind::Unique,
            message: format!("a root account named '{}' already exists", name),
        });
    }
    Ok(())
}

fn all_statements(conn: &Connection) -> Result<Vec<Statement>> {
    let sql = format!("SELECT {} FROM statements", STATEMENT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], StatementRow::from_row)?;
    let mut statements = Vec::new();
    for row in rows {
        statements.push(Statement::try_from(row?)?);
    }
    Ok(statements)
}

fn validate_new_statement(statement: &NewStatement) -> Result<()> {
    if statement.institution.trim().is_empty() {
        return Err(TallyError::Validation(
            "Institution cannot be empty".to_string(),
        ));
    }
    validate_currency(&statement.currency)?;
    if statement.period_start > statement.period_end {
        return Err(TallyError::Validation(format!(
            "Statement period starts after it ends ({} > {})",
            statement.period_start, statement.period_end
        )));
    }
    if statement.file_hash.is_empty() {
        return Err(TallyError::Validation(
            "Statement file hash cannot be empty".to_string(),
        ));
    }
    if statement.file_size < 0 {
        return Err(TallyError::Validation(
            "Statement file size cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn insert_statement(conn: &Connection, statement: &NewStatement) -> Result<Statement> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO statements (id, institution, account_id, period_start, period_end, currency, file_hash, file_size, replaced_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id.to_string(),
            statement.institution,
            statement.account_id.to_string(),
            statement.period_start.format("%Y-%m-%d").to_string(),
            statement.period_end.format("%Y-%m-%d").to_string(),
            statement.currency,
            statement.file_hash,
            statement.file_size,
            statement.replaced_by.map(|r| r.to_string()),
        ],
    )?;
    tracing::debug!(%id, hash = %statement.file_hash, "created statement");

    query_statement(conn, &id)?
        .ok_or_else(|| TallyError::Storage(format!("statement {} vanished after insert", id)))
}

/// Point `old.replaced_by` at `new`. Returns the updated `old`.
fn link_replacement(conn: &Connection, old: &Uuid, new: &Uuid) -> Result<Statement> {
    if old == new {
        return Err(TallyError::Validation(format!(
            "Statement {} cannot replace itself",
            old
        )));
    }

    let old_statement = query_statement(conn, old)?
        .ok_or_else(|| TallyError::NotFound(format!("statement {}", old)))?;
    if query_statement(conn, new)?.is_none() {
        return Err(TallyError::NotFound(format!("statement {}", new)));
    }

    if let Some(existing) = old_statement.replaced_by {
        return Err(TallyError::Validation(format!(
            "Statement {} is already replaced by {}",
            old, existing
        )));
    }

    if would_cycle(&all_statements(conn)?, old, new) {
        return Err(TallyError::StatementCycle {
            old: *old,
            new: *new,
        });
    }

    conn.execute(
        "UPDATE statements SET replaced_by = ?1 WHERE id = ?2",
        params![new.to_string(), old.to_string()],
    )?;
    query_statement(conn, old)?
        .ok_or_else(|| TallyError::NotFound(format!("statement {}", old)))
}

impl LedgerStore for SqliteStorage {
    fn create_account(&mut self, account: &NewAccount) -> Result<Account> {
        validate_account_name(&account.name)?;
        validate_currency(&account.currency)?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        if account.parent_id.is_none() {
            ensure_root_name_free(&tx, &account.name, None)?;
        }

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO accounts (id, parent_id, name, currency, note) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                account.parent_id.map(|p| p.to_string()),
                account.name,
                account.currency,
                account.note,
            ],
        )?;
        let created = query_account(&tx, &id)?
            .ok_or_else(|| TallyError::Storage(format!("account {} vanished after insert", id)))?;
        tx.commit()?;
        tracing::debug!(%id, name = %account.name, "created account");
        Ok(created)
    }

    fn get_account(&self, id: &Uuid) -> Result<Option<Account>> {
        let conn = self.lock_conn()?;
        query_account(&conn, id)
    }

    fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(parent_id) = filter.parent_id {
            conditions.push("parent_id = ?");
            params.push(Box::new(parent_id.to_string()));
        } else if filter.roots_only {
            conditions.push("parent_id IS NULL");
        }

        if !filter.include_closed {
            conditions.push("is_closed = 0");
        }

        let mut query = format!("SELECT {} FROM accounts", ACCOUNT_COLUMNS);
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY parent_id, name, id");

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            AccountRow::from_row,
        )?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(Account::try_from(row?)?);
        }
        Ok(accounts)
    }

    fn rename_account(&mut self, id: &Uuid, name: &str) -> Result<Account> {
        validate_account_name(name)?;
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let current = query_account(&tx, id)?
            .ok_or_else(|| TallyError::NotFound(format!("account {}", id)))?;
        if current.parent_id.is_none() {
            ensure_root_name_free(&tx, name, Some(id))?;
        }

        tx.execute(
            "UPDATE accounts SET name = ?1 WHERE id = ?2",
            params![name, id.to_string()],
        )?;
        let account = query_account(&tx, id)?
            .ok_or_else(|| TallyError::NotFound(format!("account {}", id)))?;
        tx.commit()?;
        tracing::debug!(%id, %name, "renamed account");
        Ok(account)
    }

    fn close_account(&mut self, id: &Uuid) -> Result<Account> {
        self.update_account(
            id,
            "UPDATE accounts SET is_closed = 1 WHERE id = ?1",
            |stmt, id| stmt.execute([id]),
        )
    }

    fn reopen_account(&mut self, id: &Uuid) -> Result<Account> {
        self.update_account(
            id,
            "UPDATE accounts SET is_closed = 0 WHERE id = ?1",
            |stmt, id| stmt.execute([id]),
        )
    }

    fn delete_account(&mut self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let id_str = id.to_string();

        if query_account(&tx, id)?.is_none() {
            return Err(TallyError::NotFound(format!("account {}", id)));
        }

        let children: i64 = tx.query_row(
            "SELECT COUNT(*) FROM accounts WHERE parent_id = ?1",
            [&id_str],
            |row| row.get(0),
        )?;
        if children > 0 {
            return Err(TallyError::AccountHasChildren(*id));
        }

        let statements: i64 = tx.query_row(
            "SELECT COUNT(*) FROM statements WHERE account_id = ?1",
            [&id_str],
            |row| row.get(0),
        )?;
        if statements > 0 {
            return Err(TallyError::AccountHasStatements(*id));
        }

        tx.execute("DELETE FROM accounts WHERE id = ?1", [&id_str])?;
        tx.commit()?;
        tracing::debug!(%id, "deleted account");
        Ok(())
    }

    fn create_statement(&mut self, statement: &NewStatement) -> Result<Statement> {
        validate_new_statement(statement)?;
        let conn = self.lock_conn()?;
        insert_statement(&conn, statement)
    }

    fn create_replacement(&mut self, statement: &NewStatement, replaces: &Uuid) -> Result<Statement> {
        validate_new_statement(statement)?;
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let created = insert_statement(&tx, statement)?;
        link_replacement(&tx, replaces, &created.id)?;
        tx.commit()?;

        tracing::info!(old = %replaces, new = %created.id, "statement superseded");
        Ok(created)
    }

    fn get_statement(&self, id: &Uuid) -> Result<Option<Statement>> {
        let conn = self.lock_conn()?;
        query_statement(&conn, id)
    }

    fn find_statement_by_hash(&self, file_hash: &str) -> Result<Option<Statement>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM statements WHERE file_hash = ?1",
            STATEMENT_COLUMNS
        );
        let row = conn
            .query_row(&sql, [file_hash], StatementRow::from_row)
            .optional()?;
        row.map(Statement::try_from).transpose()
    }

    fn list_statements(&self, filter: &StatementFilter) -> Result<Vec<Statement>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(account_id) = filter.account_id {
            conditions.push("account_id = ?");
            params.push(Box::new(account_id.to_string()));
        }

        if !filter.include_replaced {
            conditions.push("replaced_by IS NULL");
        }

        let mut query = format!("SELECT {} FROM statements", STATEMENT_COLUMNS);
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY imported_at, rowid");

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            StatementRow::from_row,
        )?;

        let mut statements = Vec::new();
        for row in rows {
            statements.push(Statement::try_from(row?)?);
        }
        Ok(statements)
    }

    fn supersede_statement(&mut self, old: &Uuid, new: &Uuid) -> Result<Statement> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let updated = link_replacement(&tx, old, new)?;
        tx.commit()?;

        tracing::info!(%old, %new, "statement superseded");
        Ok(updated)
    }

    fn check_integrity(&self) -> Result<()> {
        let mut problems: Vec<String> = Vec::new();

        {
            let conn = self.lock_conn()?;

            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let results = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            if results != ["ok"] {
                problems.extend(results.into_iter().map(|r| format!("sqlite: {}", r)));
            }

            let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
            let violations = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for table in violations {
                problems.push(format!("foreign key violation in {}", table));
            }

            let bad_periods: i64 = conn.query_row(
                "SELECT COUNT(*) FROM statements WHERE period_start > period_end",
                [],
                |row| row.get(0),
            )?;
            if bad_periods > 0 {
                problems.push(format!(
                    "{} statement(s) end before they start",
                    bad_periods
                ));
            }
        }

        let accounts = self.list_accounts(&AccountFilter::all())?;
        let account_count = accounts.len();
        match AccountTree::build(accounts) {
            Ok(tree) if tree.walk().len() != account_count => {
                problems.push("account hierarchy contains a cycle".to_string());
            }
            Ok(_) => {}
            Err(e) => problems.push(e.to_string()),
        }

        let statements = self.list_statements(&StatementFilter::all())?;
        for statement in &statements {
            if let Err(e) = StatementChain::latest(&statements, &statement.id) {
                problems.push(e.to_string());
                break;
            }
        }

        if problems.is_empty() {
            return Ok(());
        }

        for problem in &problems {
            tracing::warn!(%problem, "integrity check failed");
        }
        Err(TallyError::Integrity(problems.join("; ")))
    }

    fn schema_version(&self) -> Result<u32> {
        let conn = self.lock_conn()?;
        let applied = migration::applied_migrations(&conn)?;
        Ok(applied.last().map(|m| m.version).unwrap_or(0))
    }

    fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        let migrations = Migration::discover(&MigrationSource::embedded())?;
        let conn = self.lock_conn()?;
        Ok(migration::migration_status(&conn, &migrations)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstraintKind;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn statement_for(account_id: Uuid, hash: &str) -> NewStatement {
        NewStatement::new("Bank", account_id, date(2026, 1, 1), date(2026, 1, 31), "USD")
            .with_file(hash, 128)
    }

    #[test]
    fn test_open_in_memory_is_fully_migrated() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.schema_version().unwrap(), 3);
        assert!(storage.path().is_none());
        assert!(storage
            .migration_status()
            .unwrap()
            .iter()
            .all(|m| m.is_applied()));
    }

    #[test]
    fn test_rename_missing_account_is_not_found() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let err = storage
            .rename_account(&Uuid::new_v4(), "Anything")
            .unwrap_err();
        assert!(matches!(err, TallyError::NotFound(_)));
    }

    #[test]
    fn test_account_name_with_colon_is_rejected() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let err = storage
            .create_account(&NewAccount::new("Assets:Bank", "USD"))
            .unwrap_err();
        assert!(matches!(err, TallyError::Validation(_)));
    }

    #[test]
    fn test_close_and_reopen() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let account = storage
            .create_account(&NewAccount::new("Cash", "EUR"))
            .unwrap();

        assert!(storage.close_account(&account.id).unwrap().is_closed);
        assert!(storage
            .list_accounts(&AccountFilter::open_only())
            .unwrap()
            .is_empty());
        assert!(!storage.reopen_account(&account.id).unwrap().is_closed);
    }

    #[test]
    fn test_replacement_is_inserted_and_linked_together() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let account = storage
            .create_account(&NewAccount::new("Checking", "USD"))
            .unwrap();
        let a = storage.create_statement(&statement_for(account.id, "aa")).unwrap();
        let b = storage
            .create_replacement(&statement_for(account.id, "bb"), &a.id)
            .unwrap();

        let a = storage.get_statement(&a.id).unwrap().unwrap();
        assert_eq!(a.replaced_by, Some(b.id));
        assert!(b.is_active());
    }

    #[test]
    fn test_failed_replacement_leaves_no_row() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let account = storage
            .create_account(&NewAccount::new("Checking", "USD"))
            .unwrap();
        let a = storage.create_statement(&statement_for(account.id, "aa")).unwrap();
        let b = storage.create_statement(&statement_for(account.id, "bb")).unwrap();
        storage.supersede_statement(&a.id, &b.id).unwrap();

        // `a` is already replaced, so linking it again fails and the insert rolls back.
        let err = storage
            .create_replacement(&statement_for(account.id, "cc"), &a.id)
            .unwrap_err();
        assert!(matches!(err, TallyError::Validation(_)));
        assert!(storage.find_statement_by_hash("cc").unwrap().is_none());

        let err = storage
            .create_replacement(&statement_for(account.id, "dd"), &Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, TallyError::NotFound(_)));
        assert!(storage.find_statement_by_hash("dd").unwrap().is_none());
    }

    #[test]
    fn test_root_rename_checks_other_roots() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let assets = storage
            .create_account(&NewAccount::new("Assets", "USD"))
            .unwrap();
        storage
            .create_account(&NewAccount::new("Equity", "USD"))
            .unwrap();

        let err = storage.rename_account(&assets.id, "Equity").unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));

        // Keeping its own name is not a clash.
        assert_eq!(storage.rename_account(&assets.id, "Assets").unwrap().name, "Assets");
    }

    #[test]
    fn test_period_order_is_validated_before_insert() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let account = storage
            .create_account(&NewAccount::new("Checking", "USD"))
            .unwrap();
        let statement = NewStatement::new(
            "Bank",
            account.id,
            date(2026, 2, 1),
            date(2026, 1, 1),
            "USD",
        )
        .with_file("cc", 1);

        let err = storage.create_statement(&statement).unwrap_err();
        assert!(matches!(err, TallyError::Validation(_)));
    }

    #[test]
    fn test_check_constraint_backs_period_order() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let conn = storage.lock_conn().unwrap();
        let account_id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO accounts (id, name, currency) VALUES (?1, 'Raw', 'USD')",
            [&account_id],
        )
        .unwrap();
        let err: TallyError = conn
            .execute(
                "INSERT INTO statements (id, institution, account_id, period_start, period_end, currency, file_hash, file_size)
                 VALUES ('s1', 'Bank', ?1, '2026-02-01', '2026-01-01', 'USD', 'dd', 1)",
                [&account_id],
            )
            .unwrap_err()
            .into();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }

    #[test]
    fn test_check_integrity_passes_on_fresh_store() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.check_integrity().unwrap();
    }
}
