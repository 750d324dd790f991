//! Core data types for the storage layer.
//!
//! These mirror the `accounts` and `statements` tables produced by the
//! embedded migrations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: Uuid,

    /// Parent account; `None` for a root
    pub parent_id: Option<Uuid>,

    /// Display name, unique among siblings
    pub name: String,

    /// Settlement currency code (opaque, e.g. "USD")
    pub currency: String,

    /// Closed accounts are kept for history but inactive
    pub is_closed: bool,

    /// When this account was created
    pub created_at: DateTime<Utc>,

    /// Free-text annotation
    pub note: Option<String>,
}

/// An imported institution statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: Uuid,

    /// Issuing institution
    pub institution: String,

    /// Account this statement belongs to
    pub account_id: Uuid,

    /// First day covered (inclusive)
    pub period_start: NaiveDate,

    /// Last day covered (inclusive)
    pub period_end: NaiveDate,

    pub currency: String,

    /// Content hash of the imported file
    pub file_hash: String,

    /// Size of the imported file in bytes
    pub file_size: i64,

    pub imported_at: DateTime<Utc>,

    /// Newer statement that supersedes this one
    pub replaced_by: Option<Uuid>,
}

impl Statement {
    /// A statement is active until something replaces it.
    pub fn is_active(&self) -> bool {
        self.replaced_by.is_none()
    }
}

/// Builder for creating new accounts.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub currency: String,
    pub parent_id: Option<Uuid>,
    pub note: Option<String>,
}

impl NewAccount {
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currency: currency.into(),
            parent_id: None,
            note: None,
        }
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Builder for creating new statements.
#[derive(Debug, Clone)]
pub struct NewStatement {
    pub institution: String,
    pub account_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub currency: String,
    pub file_hash: String,
    pub file_size: i64,
    pub replaced_by: Option<Uuid>,
}

impl NewStatement {
    pub fn new(
        institution: impl Into<String>,
        account_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            institution: institution.into(),
            account_id,
            period_start,
            period_end,
            currency: currency.into(),
            file_hash: String::new(),
            file_size: 0,
            replaced_by: None,
        }
    }

    pub fn with_file(mut self, file_hash: impl Into<String>, file_size: i64) -> Self {
        self.file_hash = file_hash.into();
        self.file_size = file_size;
        self
    }

    pub fn with_replaced_by(mut self, replaced_by: Uuid) -> Self {
        self.replaced_by = Some(replaced_by);
        self
    }
}

/// Filter for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Only direct children of this account
    pub parent_id: Option<Uuid>,

    /// Only root accounts
    pub roots_only: bool,

    /// Include closed accounts
    pub include_closed: bool,
}

impl AccountFilter {
    /// All accounts, open and closed.
    pub fn all() -> Self {
        Self {
            include_closed: true,
            ..Self::default()
        }
    }

    pub fn open_only() -> Self {
        Self::default()
    }

    pub fn parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self.roots_only = false;
        self
    }

    pub fn roots(mut self) -> Self {
        self.roots_only = true;
        self.parent_id = None;
        self
    }
}

/// Filter for listing statements.
#[derive(Debug, Clone, Default)]
pub struct StatementFilter {
    /// Only statements for this account
    pub account_id: Option<Uuid>,

    /// Include statements that have been superseded
    pub include_replaced: bool,
}

impl StatementFilter {
    pub fn all() -> Self {
        Self {
            include_replaced: true,
            ..Self::default()
        }
    }

    pub fn active() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }
}
