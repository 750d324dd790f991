//! # Tally Core
//!
//! Core library for Tally, a personal finance ledger that keeps a chart of
//! accounts and a register of imported institution statements in SQLite.
//!
//! This crate provides the schema migrations, storage abstractions, and data
//! models independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **migration**: Ordered, forward-only SQL migrations compiled into the crate
//! - **storage**: Store trait, domain types, and the SQLite backend
//! - **hierarchy**: Account tree and statement replacement chains
//! - **user_data**: Data directory layout and statement import

pub mod error;
pub mod fs;
pub mod hierarchy;
pub mod migration;
pub mod storage;
pub mod user_data;

pub use error::{ConstraintKind, Result, TallyError};
pub use hierarchy::{AccountTree, StatementChain};
pub use storage::{LedgerStore, SqliteStorage};
pub use user_data::{ImportStatement, UserData};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
