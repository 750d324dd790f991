use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::AccountRenameArgs;
use crate::helpers::resolve_account;
use crate::output::account_paths;
use crate::ui::{print, receipt};

pub fn handle_rename(ctx: &AppContext, args: &AccountRenameArgs) -> anyhow::Result<()> {
    let mut storage = ctx.open_storage()?;
    let account = resolve_account(&storage, &args.account)?;
    let old_name = account.name.clone();

    let renamed = storage.rename_account(&account.id, args.name.trim())?;
    let path = account_paths(&storage)?
        .remove(&renamed.id)
        .unwrap_or_else(|| renamed.name.clone());

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None)?;
        let id = renamed.id.to_string();
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                &format!("Renamed '{}' to '{}'", old_name, renamed.name),
                &[("ID", id.as_str()), ("Path", path.as_str())],
            ),
        );
    }
    Ok(())
}
