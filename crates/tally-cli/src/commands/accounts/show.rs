use tally_core::storage::{AccountFilter, StatementFilter};
use tally_core::{AccountTree, LedgerStore};

use crate::app::AppContext;
use crate::cli::AccountShowArgs;
use crate::helpers::resolve_account;
use crate::output::{account_json, print_account_detail};
use crate::ui::{blank_line, header, hint, print, OutputMode};

pub fn handle_show(ctx: &AppContext, args: &AccountShowArgs) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let account = resolve_account(&storage, &args.account)?;

    let tree = AccountTree::build(storage.list_accounts(&AccountFilter::all())?)?;
    let path = tree.path(&account.id).unwrap_or_else(|| account.name.clone());
    let children: Vec<String> = tree
        .children(&account.id)
        .into_iter()
        .map(|child| child.name.clone())
        .collect();
    let statements = storage.list_statements(&StatementFilter::all().account(account.id))?;
    let active = statements.iter().filter(|s| s.is_active()).count();

    let ui_ctx = ctx.ui_context(args.json, None)?;

    if ui_ctx.mode.is_json() {
        let mut value = account_json(&account, Some(&path));
        value["children"] = serde_json::json!(children);
        value["statements"] = serde_json::json!({
            "total": statements.len(),
            "active": active,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match ui_ctx.mode {
        OutputMode::Pretty => {
            print(&ui_ctx, &header(&ui_ctx, "account", Some(&path)));
            blank_line(&ui_ctx);
            print_account_detail(&ui_ctx, &account, &path, statements.len());
            if !children.is_empty() {
                print(&ui_ctx, &format!("Children: {}", children.join(", ")));
            }
            blank_line(&ui_ctx);
            print(
                &ui_ctx,
                &hint(&ui_ctx, &format!("tally statement list --account {}", path)),
            );
        }
        OutputMode::Plain | OutputMode::Json => {
            print_account_detail(&ui_ctx, &account, &path, statements.len());
            println!("children={}", children.join(","));
        }
    }
    Ok(())
}
