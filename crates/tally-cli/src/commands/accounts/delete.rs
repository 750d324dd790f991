use dialoguer::Confirm;

use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::AccountDeleteArgs;
use crate::errors::CliError;
use crate::helpers::resolve_account;
use crate::ui::{badge, print, Badge, OutputMode};

pub fn handle_delete(ctx: &AppContext, args: &AccountDeleteArgs) -> anyhow::Result<()> {
    let mut storage = ctx.open_storage()?;
    let account = resolve_account(&storage, &args.account)?;
    let ui_ctx = ctx.ui_context(false, None)?;

    if !args.yes {
        if !ui_ctx.is_interactive() {
            return Err(CliError::invalid_input("Refusing to delete without confirmation")
                .with_hint("Pass --yes to delete non-interactively")
                .into());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete account '{}'?", args.account))
            .default(false)
            .interact()?;
        if !confirmed {
            if !ctx.quiet() {
                match ui_ctx.mode {
                    OutputMode::Pretty => print(&ui_ctx, &badge(&ui_ctx, Badge::Info, "Cancelled")),
                    OutputMode::Plain | OutputMode::Json => println!("status=cancelled"),
                }
            }
            return Ok(());
        }
    }

    storage.delete_account(&account.id)?;
    tracing::info!(id = %account.id, "deleted account");

    if !ctx.quiet() {
        match ui_ctx.mode {
            OutputMode::Pretty => print(
                &ui_ctx,
                &badge(
                    &ui_ctx,
                    Badge::Ok,
                    &format!("Deleted account '{}'", args.account),
                ),
            ),
            OutputMode::Plain | OutputMode::Json => {
                println!("status=ok");
                println!("deleted={}", account.id);
            }
        }
    }
    Ok(())
}
