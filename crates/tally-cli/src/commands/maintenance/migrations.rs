use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::MigrationsArgs;
use crate::ui::{blank_line, header, print, table, Column, OutputMode};

pub fn handle_migrations(ctx: &AppContext, args: &MigrationsArgs) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let statuses = storage.migration_status()?;
    let schema_version = storage.schema_version()?;

    let ui_ctx = ctx.ui_context(args.json, None)?;

    if ui_ctx.mode.is_json() {
        let output = serde_json::json!({
            "schema_version": schema_version,
            "migrations": statuses,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let applied_label = |applied_at: &Option<String>| {
        applied_at.clone().unwrap_or_else(|| "pending".to_string())
    };

    match ui_ctx.mode {
        OutputMode::Pretty => {
            print(
                &ui_ctx,
                &header(&ui_ctx, "migrations", Some(&format!("schema {}", schema_version))),
            );
            blank_line(&ui_ctx);
            let columns = [
                Column::new("Version"),
                Column::new("Name"),
                Column::new("Applied"),
            ];
            let rows: Vec<Vec<String>> = statuses
                .iter()
                .map(|m| {
                    vec![
                        format!("{:04}", m.version),
                        m.name.clone(),
                        applied_label(&m.applied_at),
                    ]
                })
                .collect();
            print(&ui_ctx, &table(&ui_ctx, &columns, &rows));
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("schema_version={}", schema_version);
            for m in &statuses {
                println!("{:04} {} {}", m.version, m.name, applied_label(&m.applied_at));
            }
        }
    }
    Ok(())
}
