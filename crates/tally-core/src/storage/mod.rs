//! Storage layer: domain types, the store trait, and the SQLite backend.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStorage;
pub use traits::LedgerStore;
pub use types::{Account, AccountFilter, NewAccount, NewStatement, Statement, StatementFilter};
