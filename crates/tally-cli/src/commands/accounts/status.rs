//! `account close` and `account reopen`.

use tally_core::storage::Account;
use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::AccountRefArgs;
use crate::helpers::resolve_account;
use crate::ui::{print, receipt};

pub fn handle_close(ctx: &AppContext, args: &AccountRefArgs) -> anyhow::Result<()> {
    let mut storage = ctx.open_storage()?;
    let account = resolve_account(&storage, &args.account)?;
    let closed = storage.close_account(&account.id)?;
    report(ctx, "Closed account", &args.account, &closed)
}

pub fn handle_reopen(ctx: &AppContext, args: &AccountRefArgs) -> anyhow::Result<()> {
    let mut storage = ctx.open_storage()?;
    let account = resolve_account(&storage, &args.account)?;
    let reopened = storage.reopen_account(&account.id)?;
    report(ctx, "Reopened account", &args.account, &reopened)
}

fn report(ctx: &AppContext, title: &str, reference: &str, account: &Account) -> anyhow::Result<()> {
    if ctx.quiet() {
        return Ok(());
    }
    let ui_ctx = ctx.ui_context(false, None)?;
    let id = account.id.to_string();
    let state = if account.is_closed { "closed" } else { "open" };
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            &format!("{} {}", title, reference),
            &[("ID", id.as_str()), ("Status", state)],
        ),
    );
    Ok(())
}
