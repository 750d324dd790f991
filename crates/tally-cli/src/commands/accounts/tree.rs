use std::collections::HashSet;

use uuid::Uuid;

use tally_core::storage::{Account, AccountFilter};
use tally_core::{AccountTree, LedgerStore};

use crate::app::AppContext;
use crate::cli::AccountTreeArgs;
use crate::ui::render::account_tree;
use crate::ui::{hint, print};

pub fn handle_tree(ctx: &AppContext, args: &AccountTreeArgs) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let accounts = storage.list_accounts(&AccountFilter::all())?;
    let tree = if args.all {
        AccountTree::build(accounts)?
    } else {
        AccountTree::build(without_closed_subtrees(accounts)?)?
    };

    let ui_ctx = ctx.ui_context(false, None)?;
    if tree.is_empty() {
        print(&ui_ctx, &hint(&ui_ctx, "No accounts yet. Try `tally account add`."));
        return Ok(());
    }
    print(&ui_ctx, &account_tree(&ui_ctx, &tree));
    Ok(())
}

/// Drop closed accounts together with everything below them.
fn without_closed_subtrees(accounts: Vec<Account>) -> anyhow::Result<Vec<Account>> {
    let full = AccountTree::build(accounts.clone())?;
    let mut hidden: HashSet<Uuid> = HashSet::new();
    for account in accounts.iter().filter(|a| a.is_closed) {
        hidden.insert(account.id);
        hidden.extend(full.descendants(&account.id).into_iter().map(|a| a.id));
    }
    Ok(accounts
        .into_iter()
        .filter(|a| !hidden.contains(&a.id))
        .collect())
}
