//! Raw row types for database queries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{Result, TallyError};
use crate::storage::types::{Account, Statement};

pub(super) const ACCOUNT_COLUMNS: &str = "id, parent_id, name, currency, is_closed, created_at, note";

pub(super) const STATEMENT_COLUMNS: &str = "id, institution, account_id, period_start, period_end, currency, file_hash, file_size, imported_at, replaced_by";

/// Raw row data from the accounts table, before parsing into domain types.
#[derive(Debug)]
pub struct AccountRow {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub currency: String,
    pub is_closed: i64,
    pub created_at: String,
    pub note: Option<String>,
}

impl AccountRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            name: row.get(2)?,
            currency: row.get(3)?,
            is_closed: row.get(4)?,
            created_at: row.get(5)?,
            note: row.get(6)?,
        })
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = TallyError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Account {
            id: parse_uuid(&row.id, "accounts.id")?,
            parent_id: row
                .parent_id
                .as_deref()
                .map(|s| parse_uuid(s, "accounts.parent_id"))
                .transpose()?,
            name: row.name,
            currency: row.currency,
            is_closed: row.is_closed != 0,
            created_at: parse_timestamp(&row.created_at, "accounts.created_at")?,
            note: row.note,
        })
    }
}

/// Raw row data from the statements table.
#[derive(Debug)]
pub struct StatementRow {
    pub id: String,
    pub institution: String,
    pub account_id: String,
    pub period_start: String,
    pub period_end: String,
    pub currency: String,
    pub file_hash: String,
    pub file_size: i64,
    pub imported_at: String,
    pub replaced_by: Option<String>,
}

impl StatementRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            institution: row.get(1)?,
            account_id: row.get(2)?,
            period_start: row.get(3)?,
            period_end: row.get(4)?,
            currency: row.get(5)?,
            file_hash: row.get(6)?,
            file_size: row.get(7)?,
            imported_at: row.get(8)?,
            replaced_by: row.get(9)?,
        })
    }
}

impl TryFrom<StatementRow> for Statement {
    type Error = TallyError;

    fn try_from(row: StatementRow) -> Result<Self> {
        Ok(Statement {
            id: parse_uuid(&row.id, "statements.id")?,
            institution: row.institution,
            account_id: parse_uuid(&row.account_id, "statements.account_id")?,
            period_start: parse_date(&row.period_start, "statements.period_start")?,
            period_end: parse_date(&row.period_end, "statements.period_end")?,
            currency: row.currency,
            file_hash: row.file_hash,
            file_size: row.file_size,
            imported_at: parse_timestamp(&row.imported_at, "statements.imported_at")?,
            replaced_by: row
                .replaced_by
                .as_deref()
                .map(|s| parse_uuid(s, "statements.replaced_by"))
                .transpose()?,
        })
    }
}

fn parse_uuid(value: &str, column: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| TallyError::Storage(format!("Invalid UUID in {}: {}", column, e)))
}

fn parse_date(value: &str, column: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| TallyError::Storage(format!("Invalid date in {}: {}", column, e)))
}

/// SQLite's `datetime('now')` yields `YYYY-MM-DD HH:MM:SS` in UTC; values
/// written by other tools may be RFC 3339.
fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TallyError::Storage(format!("Invalid timestamp in {}: {}", column, e)))
}
