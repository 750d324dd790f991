use tally_core::storage::StatementFilter;
use tally_core::{LedgerStore, TallyError};

use crate::app::AppContext;
use crate::errors::CliError;
use crate::ui::{badge, hint, kv, print, Badge, OutputMode};

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let user_data = ctx.user_data()?;

    let mut problems: Vec<String> = match storage.check_integrity() {
        Ok(()) => Vec::new(),
        Err(TallyError::Integrity(report)) => report.split("; ").map(str::to_string).collect(),
        Err(e) => return Err(e.into()),
    };

    // Every recorded statement needs its managed copy.
    for statement in storage.list_statements(&StatementFilter::all())? {
        if user_data.statement_file_path(&statement.file_hash)?.is_none() {
            problems.push(format!(
                "statement {} has no file in {}",
                statement.id,
                user_data.statements_dir().display()
            ));
        }
    }

    let schema_version = storage.schema_version()?;
    let ui_ctx = ctx.ui_context(false, None)?;

    if problems.is_empty() {
        if !ctx.quiet() {
            match ui_ctx.mode {
                OutputMode::Pretty => {
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "Integrity check passed"));
                    print(
                        &ui_ctx,
                        &format!("  {}", kv(&ui_ctx, "Schema", &schema_version.to_string())),
                    );
                }
                OutputMode::Plain | OutputMode::Json => {
                    println!("status=ok");
                    println!("integrity=ok");
                    println!("schema_version={}", schema_version);
                }
            }
        }
        return Ok(());
    }

    match ui_ctx.mode {
        OutputMode::Pretty => {
            print(&ui_ctx, &badge(&ui_ctx, Badge::Err, "Integrity check failed"));
            for problem in &problems {
                print(&ui_ctx, &format!("  - {}", problem));
            }
            print(
                &ui_ctx,
                &hint(&ui_ctx, "Restore the data directory from a backup"),
            );
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("integrity=failed");
            for problem in &problems {
                println!("problem={}", problem);
            }
        }
    }

    Err(CliError::integrity(format!(
        "Integrity check found {} problem(s)",
        problems.len()
    ))
    .into())
}
