use tally_core::ImportStatement;

use crate::app::AppContext;
use crate::cli::StatementImportArgs;
use crate::errors::CliError;
use crate::helpers::{parse_currency, parse_period, resolve_account, resolve_statement};
use crate::output::account_paths;
use crate::ui::{blank_line, format_bytes, format_period, hint, print, receipt, short_id, OutputMode};

pub fn handle_import(ctx: &AppContext, args: &StatementImportArgs) -> anyhow::Result<()> {
    let (period_start, period_end) = parse_period(&args.from, &args.to)?;
    let currency = args.currency.as_deref().map(parse_currency).transpose()?;
    let institution = args.institution.trim();
    if institution.is_empty() {
        return Err(CliError::invalid_input("Institution must not be empty").into());
    }

    let user_data = ctx.user_data()?;
    let mut storage = ctx.open_storage()?;
    let account = resolve_account(&storage, &args.account)?;
    let replaces = args
        .replaces
        .as_deref()
        .map(|reference| resolve_statement(&storage, reference))
        .transpose()?
        .map(|statement| statement.id);

    let import = ImportStatement {
        account_id: account.id,
        institution: institution.to_string(),
        period_start,
        period_end,
        currency,
        replaces,
    };
    let statement = user_data.import_statement(&mut storage, &args.file, &import)?;

    if ctx.quiet() {
        return Ok(());
    }

    let ui_ctx = ctx.ui_context(false, None)?;
    let id = statement.id.to_string();
    let path = account_paths(&storage)?
        .remove(&account.id)
        .unwrap_or_else(|| account.name.clone());
    let period = format_period(&statement.period_start, &statement.period_end);
    let size = if ui_ctx.mode.is_pretty() {
        format_bytes(u64::try_from(statement.file_size).unwrap_or(0))
    } else {
        statement.file_size.to_string()
    };
    let stored = user_data
        .statement_file_path(&statement.file_hash)?
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let replaced = replaces.map(|r| r.to_string()).unwrap_or_default();

    let mut items = vec![
        ("ID", id.as_str()),
        ("Account", path.as_str()),
        ("Period", period.as_str()),
        ("Currency", statement.currency.as_str()),
        ("Size", size.as_str()),
        ("File Hash", statement.file_hash.as_str()),
        ("Stored", stored.as_str()),
    ];
    if replaces.is_some() {
        items.push(("Replaces", replaced.as_str()));
    }
    print(&ui_ctx, &receipt(&ui_ctx, "Imported statement", &items));

    if ui_ctx.mode == OutputMode::Pretty {
        blank_line(&ui_ctx);
        print(
            &ui_ctx,
            &hint(
                &ui_ctx,
                &format!("tally statement history {}", short_id(&statement.id)),
            ),
        );
    }
    Ok(())
}
