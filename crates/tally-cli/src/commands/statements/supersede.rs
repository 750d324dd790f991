use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::StatementSupersedeArgs;
use crate::helpers::resolve_statement;
use crate::ui::{print, receipt};

pub fn handle_supersede(ctx: &AppContext, args: &StatementSupersedeArgs) -> anyhow::Result<()> {
    let mut storage = ctx.open_storage()?;
    let old = resolve_statement(&storage, &args.old)?;
    let new = resolve_statement(&storage, &args.new)?;

    let updated = storage.supersede_statement(&old.id, &new.id)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None)?;
        let old_id = updated.id.to_string();
        let new_id = new.id.to_string();
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Statement superseded",
                &[("Old", old_id.as_str()), ("Replaced By", new_id.as_str())],
            ),
        );
    }
    Ok(())
}
