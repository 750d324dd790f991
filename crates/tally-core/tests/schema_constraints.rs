use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use tally_core::migration::{Migration, MigrationRunner, MigrationSource};
use tally_core::storage::{
    AccountFilter, LedgerStore, NewAccount, NewStatement, SqliteStorage, StatementFilter,
};
use tally_core::{ConstraintKind, TallyError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn january(account_id: Uuid, hash: &str) -> NewStatement {
    NewStatement::new("First Bank", account_id, date(2026, 1, 1), date(2026, 1, 31), "USD")
        .with_file(hash, 2048)
}

fn store() -> SqliteStorage {
    SqliteStorage::open_in_memory().expect("in-memory store should open")
}

#[test]
fn test_duplicate_sibling_name_is_unique_violation() {
    let mut storage = store();
    let assets = storage
        .create_account(&NewAccount::new("Assets", "USD"))
        .expect("create root");
    storage
        .create_account(&NewAccount::new("Bank", "USD").with_parent(assets.id))
        .expect("create child");

    let err = storage
        .create_account(&NewAccount::new("Bank", "USD").with_parent(assets.id))
        .expect_err("duplicate sibling should fail");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
}

#[test]
fn test_same_name_under_different_parents_is_allowed() {
    let mut storage = store();
    let assets = storage
        .create_account(&NewAccount::new("Assets", "USD"))
        .expect("create root");
    let liabilities = storage
        .create_account(&NewAccount::new("Liabilities", "USD"))
        .expect("create root");

    storage
        .create_account(&NewAccount::new("Bank", "USD").with_parent(assets.id))
        .expect("first Bank");
    storage
        .create_account(&NewAccount::new("Bank", "USD").with_parent(liabilities.id))
        .expect("second Bank under another parent");

    assert_eq!(storage.list_accounts(&AccountFilter::all()).unwrap().len(), 4);
}

#[test]
fn test_duplicate_root_name_is_unique_violation() {
    let mut storage = store();
    storage
        .create_account(&NewAccount::new("Assets", "USD"))
        .expect("create root");
    let equity = storage
        .create_account(&NewAccount::new("Equity", "USD"))
        .expect("create second root");

    let err = storage
        .create_account(&NewAccount::new("Assets", "EUR"))
        .expect_err("duplicate root should fail");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));

    let err = storage
        .rename_account(&equity.id, "Assets")
        .expect_err("renaming onto another root should fail");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
}

#[test]
fn test_missing_parent_is_foreign_key_violation() {
    let mut storage = store();
    let err = storage
        .create_account(&NewAccount::new("Orphan", "USD").with_parent(Uuid::new_v4()))
        .expect_err("dangling parent should fail");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
}

#[test]
fn test_duplicate_file_hash_is_unique_violation() {
    let mut storage = store();
    let account = storage
        .create_account(&NewAccount::new("Checking", "USD"))
        .expect("create account");

    storage
        .create_statement(&january(account.id, "hash-1"))
        .expect("first import");
    let err = storage
        .create_statement(&january(account.id, "hash-1"))
        .expect_err("same hash should fail");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));

    storage
        .create_statement(&january(account.id, "hash-2"))
        .expect("different hash for same account");
}

#[test]
fn test_replaced_by_must_reference_existing_statement() {
    let mut storage = store();
    let account = storage
        .create_account(&NewAccount::new("Checking", "USD"))
        .expect("create account");
    let newer = storage
        .create_statement(&january(account.id, "newer"))
        .expect("newer statement");

    let older = storage
        .create_statement(&january(account.id, "older").with_replaced_by(newer.id))
        .expect("replaced_by an existing statement");
    assert_eq!(older.replaced_by, Some(newer.id));
    assert!(!older.is_active());

    let err = storage
        .create_statement(&january(account.id, "dangling").with_replaced_by(Uuid::new_v4()))
        .expect_err("dangling replaced_by should fail");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
}

#[test]
fn test_statement_requires_existing_account() {
    let mut storage = store();
    let err = storage
        .create_statement(&january(Uuid::new_v4(), "no-account"))
        .expect_err("unknown account should fail");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
}

#[test]
fn test_delete_account_is_guarded() {
    let mut storage = store();
    let assets = storage
        .create_account(&NewAccount::new("Assets", "USD"))
        .expect("create root");
    let checking = storage
        .create_account(&NewAccount::new("Checking", "USD").with_parent(assets.id))
        .expect("create child");
    storage
        .create_statement(&january(checking.id, "guard"))
        .expect("statement");

    assert!(matches!(
        storage.delete_account(&assets.id),
        Err(TallyError::AccountHasChildren(id)) if id == assets.id
    ));
    assert!(matches!(
        storage.delete_account(&checking.id),
        Err(TallyError::AccountHasStatements(id)) if id == checking.id
    ));
    assert!(matches!(
        storage.delete_account(&Uuid::new_v4()),
        Err(TallyError::NotFound(_))
    ));

    let spare = storage
        .create_account(&NewAccount::new("Spare", "USD"))
        .expect("create spare");
    storage.delete_account(&spare.id).expect("leaf delete");
    assert!(storage.get_account(&spare.id).unwrap().is_none());
}

#[test]
fn test_supersede_refuses_self_and_cycles() {
    let mut storage = store();
    let account = storage
        .create_account(&NewAccount::new("Checking", "USD"))
        .expect("create account");
    let a = storage.create_statement(&january(account.id, "a")).unwrap();
    let b = storage.create_statement(&january(account.id, "b")).unwrap();
    let c = storage.create_statement(&january(account.id, "c")).unwrap();

    assert!(matches!(
        storage.supersede_statement(&a.id, &a.id),
        Err(TallyError::Validation(_))
    ));

    storage.supersede_statement(&a.id, &b.id).expect("a -> b");
    storage.supersede_statement(&b.id, &c.id).expect("b -> c");

    assert!(matches!(
        storage.supersede_statement(&c.id, &a.id),
        Err(TallyError::StatementCycle { .. })
    ));
    assert!(matches!(
        storage.supersede_statement(&a.id, &c.id),
        Err(TallyError::Validation(_))
    ));

    let active = storage.list_statements(&StatementFilter::active()).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, c.id);
    assert_eq!(
        storage
            .list_statements(&StatementFilter::all().account(account.id))
            .unwrap()
            .len(),
        3
    );
    storage.check_integrity().expect("chain is consistent");
}

#[test]
fn test_list_accounts_filters() {
    let mut storage = store();
    let assets = storage
        .create_account(&NewAccount::new("Assets", "USD"))
        .unwrap();
    let bank = storage
        .create_account(&NewAccount::new("Bank", "USD").with_parent(assets.id))
        .unwrap();
    let cash = storage
        .create_account(&NewAccount::new("Cash", "USD").with_parent(assets.id))
        .unwrap();
    storage.close_account(&cash.id).unwrap();

    let roots = storage.list_accounts(&AccountFilter::all().roots()).unwrap();
    assert_eq!(roots.len(), 1);

    let open_children = storage
        .list_accounts(&AccountFilter::open_only().parent(assets.id))
        .unwrap();
    assert_eq!(open_children.len(), 1);
    assert_eq!(open_children[0].id, bank.id);

    let all_children = storage
        .list_accounts(&AccountFilter::all().parent(assets.id))
        .unwrap();
    let names: Vec<&str> = all_children.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Bank", "Cash"]);
}

#[test]
fn test_hierarchy_migration_preserves_accounts() {
    let mut conn = Connection::open_in_memory().expect("open");
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    let source = MigrationSource::embedded();
    let migrations = Migration::discover(&source).expect("discover");

    MigrationRunner::new(&mut conn)
        .run(&source, &migrations[..1])
        .expect("apply 0001");

    conn.execute_batch(
        "INSERT INTO accounts (id, name, kind, currency, is_closed, created_at)
         VALUES ('11111111-1111-4111-8111-111111111111', 'Checking', 'asset', 'USD', 0, '2025-12-01 08:00:00');
         INSERT INTO accounts (id, name, kind, currency, is_closed, created_at)
         VALUES ('22222222-2222-4222-8222-222222222222', 'Visa', 'liability', 'EUR', 1, '2025-12-02 09:15:00');",
    )
    .unwrap();

    let applied = MigrationRunner::new(&mut conn)
        .run(&source, &migrations)
        .expect("apply remaining");
    assert_eq!(applied, vec![2, 3]);

    let mut stmt = conn
        .prepare("SELECT id, parent_id, name, currency, is_closed, created_at, note FROM accounts ORDER BY id")
        .unwrap();
    let rows: Vec<(String, Option<String>, String, String, i64, String, Option<String>)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        rows,
        vec![
            (
                "11111111-1111-4111-8111-111111111111".to_string(),
                None,
                "Checking".to_string(),
                "USD".to_string(),
                0,
                "2025-12-01 08:00:00".to_string(),
                None,
            ),
            (
                "22222222-2222-4222-8222-222222222222".to_string(),
                None,
                "Visa".to_string(),
                "EUR".to_string(),
                1,
                "2025-12-02 09:15:00".to_string(),
                None,
            ),
        ]
    );

    let kind_columns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('accounts') WHERE name = 'kind'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(kind_columns, 0);
}

#[test]
fn test_reopening_file_database_applies_nothing_new() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tally.db");

    let account_id = {
        let mut storage = SqliteStorage::open(&path).expect("first open");
        storage
            .create_account(&NewAccount::new("Cash", "USD"))
            .unwrap()
            .id
    };

    let storage = SqliteStorage::open(&path).expect("second open");
    assert_eq!(storage.schema_version().unwrap(), 3);
    assert!(storage.get_account(&account_id).unwrap().is_some());
}

/// Apply only 0001 to a fresh connection and seed it with flat-schema rows.
fn legacy_connection(seed: &str) -> (Connection, MigrationSource, Vec<Migration>) {
    let mut conn = Connection::open_in_memory().expect("open");
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    let source = MigrationSource::embedded();
    let migrations = Migration::discover(&source).expect("discover");
    MigrationRunner::new(&mut conn)
        .run(&source, &migrations[..1])
        .expect("apply 0001");
    conn.execute_batch(seed).expect("seed legacy rows");
    (conn, source, migrations)
}

#[test]
fn test_hierarchy_migration_keeps_names_told_apart_by_kind() {
    let (mut conn, source, migrations) = legacy_connection(
        "INSERT INTO accounts (id, name, kind, currency) VALUES ('a', 'Cash', 'asset', 'USD');
         INSERT INTO accounts (id, name, kind, currency) VALUES ('b', 'Cash', 'expense', 'USD');
         INSERT INTO accounts (id, name, kind, currency, is_closed) VALUES ('c', 'Old', 'asset', 'EUR', 2);",
    );

    let applied = MigrationRunner::new(&mut conn)
        .run(&source, &migrations)
        .expect("0002 accepts every 0001 row");
    assert_eq!(applied, vec![2, 3]);

    let mut stmt = conn
        .prepare("SELECT id, parent_id, name, currency, is_closed FROM accounts ORDER BY id")
        .unwrap();
    let rows: Vec<(String, Option<String>, String, String, i64)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("a".to_string(), None, "Cash".to_string(), "USD".to_string(), 0),
            ("b".to_string(), None, "Cash".to_string(), "USD".to_string(), 0),
            ("c".to_string(), None, "Old".to_string(), "EUR".to_string(), 2),
        ]
    );
}

#[test]
fn test_store_opens_database_with_legacy_duplicate_roots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tally.db");
    {
        let mut conn = Connection::open(&path).expect("open file");
        let source = MigrationSource::embedded();
        let migrations = Migration::discover(&source).expect("discover");
        MigrationRunner::new(&mut conn)
            .run(&source, &migrations[..1])
            .expect("apply 0001");
        conn.execute_batch(
            "INSERT INTO accounts (id, name, kind, currency, is_closed)
             VALUES ('33333333-3333-4333-8333-333333333333', 'Cash', 'asset', 'USD', 0);
             INSERT INTO accounts (id, name, kind, currency, is_closed)
             VALUES ('44444444-4444-4444-8444-444444444444', 'Cash', 'expense', 'USD', 2);",
        )
        .expect("seed legacy rows");
    }

    let mut storage = SqliteStorage::open(&path).expect("legacy database opens");
    assert_eq!(storage.schema_version().unwrap(), 3);

    let accounts = storage.list_accounts(&AccountFilter::all()).unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts.iter().all(|a| a.name == "Cash"));
    assert_eq!(accounts.iter().filter(|a| a.is_closed).count(), 1);
    assert_eq!(
        storage.list_accounts(&AccountFilter::open_only()).unwrap().len(),
        1
    );

    // Existing clashes stay readable, new ones are refused.
    let err = storage
        .create_account(&NewAccount::new("Cash", "USD"))
        .expect_err("new duplicate root");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    storage.check_integrity().expect("legacy rows are consistent");
}
