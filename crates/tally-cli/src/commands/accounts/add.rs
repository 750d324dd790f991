use tally_core::storage::NewAccount;
use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::AccountAddArgs;
use crate::errors::CliError;
use crate::helpers::{parse_currency, resolve_account};
use crate::output::account_paths;
use crate::ui::{blank_line, hint, print, receipt, OutputMode};

pub fn handle_add(ctx: &AppContext, args: &AccountAddArgs) -> anyhow::Result<()> {
    let mut storage = ctx.open_storage()?;

    let currency = match args.currency.as_deref() {
        Some(code) => parse_currency(code)?,
        None => ctx.default_currency()?.ok_or_else(|| {
            CliError::invalid_input("No currency given")
                .with_hint("Pass --currency or set [ui] default_currency in the config")
        })?,
    };

    let mut new_account = NewAccount::new(args.name.trim(), currency);
    if let Some(reference) = args.parent.as_deref() {
        let parent = resolve_account(&storage, reference)?;
        if parent.is_closed {
            tracing::warn!(parent = %parent.id, "adding account under a closed parent");
        }
        new_account = new_account.with_parent(parent.id);
    }
    if let Some(note) = args.note.as_deref() {
        new_account = new_account.with_note(note);
    }

    let account = storage.create_account(&new_account)?;
    let path = account_paths(&storage)?
        .remove(&account.id)
        .unwrap_or_else(|| account.name.clone());

    tracing::info!(id = %account.id, %path, "created account");
    if ctx.quiet() {
        return Ok(());
    }
    let ui_ctx = ctx.ui_context(false, None)?;

    let id = account.id.to_string();
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            "Created account",
            &[
                ("ID", id.as_str()),
                ("Path", path.as_str()),
                ("Currency", account.currency.as_str()),
            ],
        ),
    );
    if ui_ctx.mode == OutputMode::Pretty {
        blank_line(&ui_ctx);
        print(
            &ui_ctx,
            &hint(
                &ui_ctx,
                &format!("tally account add <NAME> --parent {}  \u{00B7}  tally account tree", path),
            ),
        );
    }
    Ok(())
}
