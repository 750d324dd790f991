use tally_core::storage::{Statement, StatementFilter};
use tally_core::{LedgerStore, StatementChain};

use crate::app::AppContext;
use crate::cli::StatementHistoryArgs;
use crate::helpers::resolve_statement;
use crate::output::{account_paths, statement_json};
use crate::ui::{
    blank_line, format_datetime, format_period, header, kv, print, short_id, simple_table, Column,
    OutputMode,
};

pub fn handle_history(ctx: &AppContext, args: &StatementHistoryArgs) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let target = resolve_statement(&storage, &args.id)?;
    let statements = storage.list_statements(&StatementFilter::all())?;
    let paths = account_paths(&storage)?;

    let chain: Vec<&Statement> = StatementChain::history(&statements, &target.id)?;
    let predecessors = StatementChain::predecessors(&statements, &target.id);
    let latest = chain.last().map(|s| s.id).unwrap_or(target.id);

    let ui_ctx = ctx.ui_context(args.json, None)?;
    let path_of = |s: &Statement| paths.get(&s.account_id).map(String::as_str);

    if ui_ctx.mode.is_json() {
        let output = serde_json::json!({
            "statement": target.id,
            "latest": latest,
            "chain": chain.iter().map(|&s| statement_json(s, path_of(s))).collect::<Vec<_>>(),
            "replaces": predecessors.iter().map(|s| s.id).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match ui_ctx.mode {
        OutputMode::Pretty => {
            print(
                &ui_ctx,
                &header(&ui_ctx, "statement history", Some(&short_id(&target.id))),
            );
            blank_line(&ui_ctx);
            let columns = [
                Column::new(""),
                Column::new("ID"),
                Column::new("Institution"),
                Column::new("Period"),
                Column::new("Imported"),
            ];
            let rows: Vec<Vec<String>> = chain
                .iter()
                .map(|s| {
                    let marker = if s.id == latest { "latest" } else { "" };
                    vec![
                        marker.to_string(),
                        short_id(&s.id),
                        s.institution.clone(),
                        format_period(&s.period_start, &s.period_end),
                        format_datetime(&s.imported_at, true),
                    ]
                })
                .collect();
            print(&ui_ctx, &simple_table(&ui_ctx, &columns, &rows));
            if !predecessors.is_empty() {
                blank_line(&ui_ctx);
                let ids: Vec<String> = predecessors.iter().map(|s| short_id(&s.id)).collect();
                print(&ui_ctx, &kv(&ui_ctx, "Replaces", &ids.join(", ")));
            }
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("latest={}", latest);
            for s in &chain {
                println!(
                    "{} {} {}",
                    s.id,
                    format_period(&s.period_start, &s.period_end),
                    format_datetime(&s.imported_at, false)
                );
            }
            for s in &predecessors {
                println!("replaces={}", s.id);
            }
        }
    }
    Ok(())
}
