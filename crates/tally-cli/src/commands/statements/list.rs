use tally_core::storage::StatementFilter;
use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::StatementListArgs;
use crate::helpers::resolve_account;
use crate::output::{account_paths, print_statement_list, statements_json};
use crate::ui::{blank_line, header, hint, print, OutputMode};

pub fn handle_list(ctx: &AppContext, args: &StatementListArgs) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;

    let mut filter = if args.all {
        StatementFilter::all()
    } else {
        StatementFilter::active()
    };
    if let Some(reference) = args.account.as_deref() {
        filter = filter.account(resolve_account(&storage, reference)?.id);
    }

    let statements = storage.list_statements(&filter)?;
    let paths = account_paths(&storage)?;
    let ui_ctx = ctx.ui_context(args.json, args.format.as_deref())?;

    if ui_ctx.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&statements_json(&statements, &paths))?
        );
        return Ok(());
    }

    if statements.is_empty() {
        match ui_ctx.mode {
            OutputMode::Pretty => {
                print(&ui_ctx, &header(&ui_ctx, "statements", None));
                blank_line(&ui_ctx);
                print(&ui_ctx, &hint(&ui_ctx, "No statements found."));
            }
            OutputMode::Plain | OutputMode::Json => println!("count=0"),
        }
        return Ok(());
    }

    if ui_ctx.mode == OutputMode::Pretty {
        print(
            &ui_ctx,
            &header(&ui_ctx, "statements", Some(&statements.len().to_string())),
        );
        blank_line(&ui_ctx);
    }
    print_statement_list(&ui_ctx, &statements, &paths);
    Ok(())
}
