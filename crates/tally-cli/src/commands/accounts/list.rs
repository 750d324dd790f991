use tally_core::storage::{Account, AccountFilter};
use tally_core::{AccountTree, LedgerStore};

use crate::app::AppContext;
use crate::cli::AccountListArgs;
use crate::output::{accounts_json, paths_from_tree, print_account_list};
use crate::ui::{blank_line, header, hint, print, OutputMode};

pub fn handle_list(ctx: &AppContext, args: &AccountListArgs) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let tree = AccountTree::build(storage.list_accounts(&AccountFilter::all())?)?;
    let paths = paths_from_tree(&tree);

    let accounts: Vec<Account> = tree
        .walk()
        .into_iter()
        .map(|(_, account)| account)
        .filter(|account| args.all || !account.is_closed)
        .cloned()
        .collect();

    let ui_ctx = ctx.ui_context(args.json, args.format.as_deref())?;

    if ui_ctx.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&accounts_json(&accounts, &paths))?
        );
        return Ok(());
    }

    if accounts.is_empty() {
        match ui_ctx.mode {
            OutputMode::Pretty => {
                print(&ui_ctx, &header(&ui_ctx, "accounts", None));
                blank_line(&ui_ctx);
                print(&ui_ctx, &hint(&ui_ctx, "No accounts yet. Try `tally account add`."));
            }
            OutputMode::Plain | OutputMode::Json => println!("count=0"),
        }
        return Ok(());
    }

    if ui_ctx.mode == OutputMode::Pretty {
        let context = if args.all {
            format!("{} incl. closed", accounts.len())
        } else {
            accounts.len().to_string()
        };
        print(&ui_ctx, &header(&ui_ctx, "accounts", Some(&context)));
        blank_line(&ui_ctx);
    }
    print_account_list(&ui_ctx, &accounts, &paths);
    Ok(())
}
