//! Text and table output for accounts and statements.

use std::collections::HashMap;

use tally_core::storage::{Account, AccountFilter, Statement};
use tally_core::{AccountTree, LedgerStore};
use uuid::Uuid;

use crate::ui::format::single_line;
use crate::ui::{
    format_bytes, format_datetime, format_period, kv, print, short_id, simple_table, truncate,
    Column, OutputMode, UiContext,
};

/// Every account's colon path, keyed by ID.
pub fn account_paths<S: LedgerStore + ?Sized>(store: &S) -> anyhow::Result<HashMap<Uuid, String>> {
    let tree = AccountTree::build(store.list_accounts(&AccountFilter::all())?)?;
    Ok(paths_from_tree(&tree))
}

pub fn paths_from_tree(tree: &AccountTree) -> HashMap<Uuid, String> {
    tree.walk()
        .into_iter()
        .filter_map(|(_, account)| tree.path(&account.id).map(|path| (account.id, path)))
        .collect()
}

fn status_label(closed: bool) -> &'static str {
    if closed {
        "closed"
    } else {
        "open"
    }
}

pub fn print_account_detail(ctx: &UiContext, account: &Account, path: &str, statements: usize) {
    let id = account.id.to_string();
    let parent = account
        .parent_id
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let created = format_datetime(&account.created_at, ctx.mode.is_pretty());
    let count = statements.to_string();

    let mut fields = vec![
        ("ID", id.as_str()),
        ("Path", path),
        ("Name", account.name.as_str()),
        ("Currency", account.currency.as_str()),
        ("Status", status_label(account.is_closed)),
        ("Parent", parent.as_str()),
        ("Created", created.as_str()),
        ("Statements", count.as_str()),
    ];
    let note = account.note.as_deref().map(single_line);
    if let Some(note) = note.as_deref() {
        fields.push(("Note", note));
    }
    for (key, value) in fields {
        print(ctx, &kv(ctx, key, value));
    }
}

pub fn print_account_list(ctx: &UiContext, accounts: &[Account], paths: &HashMap<Uuid, String>) {
    match ctx.mode {
        OutputMode::Pretty => {
            let columns = [
                Column::new("ID"),
                Column::new("Account"),
                Column::new("Currency"),
                Column::new("Status"),
            ];
            let rows: Vec<Vec<String>> = accounts
                .iter()
                .map(|a| {
                    vec![
                        short_id(&a.id),
                        truncate(path_of(a, paths), ctx.width.saturating_sub(30).max(20)),
                        a.currency.clone(),
                        status_label(a.is_closed).to_string(),
                    ]
                })
                .collect();
            print(ctx, &simple_table(ctx, &columns, &rows));
        }
        OutputMode::Plain | OutputMode::Json => {
            for a in accounts {
                println!(
                    "{} {} {} {}",
                    a.id,
                    path_of(a, paths),
                    a.currency,
                    status_label(a.is_closed)
                );
            }
        }
    }
}

fn path_of<'a>(account: &'a Account, paths: &'a HashMap<Uuid, String>) -> &'a str {
    paths
        .get(&account.id)
        .map(String::as_str)
        .unwrap_or(&account.name)
}

pub fn print_statement_list(
    ctx: &UiContext,
    statements: &[Statement],
    paths: &HashMap<Uuid, String>,
) {
    let account_of = |s: &Statement| {
        paths
            .get(&s.account_id)
            .cloned()
            .unwrap_or_else(|| s.account_id.to_string())
    };
    let state = |s: &Statement| match s.replaced_by {
        Some(next) => format!("replaced by {}", short_id(&next)),
        None => "active".to_string(),
    };

    match ctx.mode {
        OutputMode::Pretty => {
            let columns = [
                Column::new("ID"),
                Column::new("Account"),
                Column::new("Institution"),
                Column::new("Period"),
                Column::new("Size"),
                Column::new("State"),
            ];
            let rows: Vec<Vec<String>> = statements
                .iter()
                .map(|s| {
                    vec![
                        short_id(&s.id),
                        truncate(&account_of(s), 32),
                        truncate(&s.institution, 24),
                        format_period(&s.period_start, &s.period_end),
                        format_bytes(u64::try_from(s.file_size).unwrap_or(0)),
                        state(s),
                    ]
                })
                .collect();
            print(ctx, &simple_table(ctx, &columns, &rows));
        }
        OutputMode::Plain | OutputMode::Json => {
            for s in statements {
                println!(
                    "{} {} {} {} {}",
                    s.id,
                    account_of(s),
                    format_period(&s.period_start, &s.period_end),
                    s.file_hash,
                    s.replaced_by
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::storage::NewAccount;
    use tally_core::SqliteStorage;

    #[test]
    fn test_account_paths_cover_every_account() {
        let mut store = SqliteStorage::open_in_memory().unwrap();
        let assets = store
            .create_account(&NewAccount::new("Assets", "USD"))
            .unwrap();
        let bank = store
            .create_account(&NewAccount::new("Bank", "USD").with_parent(assets.id))
            .unwrap();
        store.close_account(&bank.id).unwrap();

        let paths = account_paths(&store).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[&bank.id], "Assets:Bank");
    }
}
