use dialoguer::Confirm;

use tally_core::LedgerStore;

use crate::app::AppContext;
use crate::cli::DeleteDbArgs;
use crate::config::{write_config, TallyConfig};
use crate::errors::CliError;
use crate::ui::{badge, blank_line, hint, kv, print, Badge, OutputMode};

pub fn handle_init(ctx: &AppContext) -> anyhow::Result<()> {
    let user_data = ctx.user_data()?;
    let existed = user_data.db_exists();

    let storage = user_data.init()?;
    let schema_version = storage.schema_version()?;
    drop(storage);

    let config_path = ctx.config_path()?;
    let wrote_config = if config_path.exists() {
        false
    } else {
        write_config(config_path, &TallyConfig::for_data_dir(user_data.data_dir()))?;
        tracing::info!(path = %config_path.display(), "wrote config");
        true
    };

    if ctx.quiet() {
        return Ok(());
    }

    let ui_ctx = ctx.ui_context(false, None)?;
    let data_dir = user_data.data_dir().display().to_string();
    let db_path = user_data.db_path().display().to_string();
    match ui_ctx.mode {
        OutputMode::Pretty => {
            let title = if existed {
                "Database is up to date"
            } else {
                "Created database"
            };
            print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, title));
            print(&ui_ctx, &format!("  {}", kv(&ui_ctx, "Data", &data_dir)));
            print(&ui_ctx, &format!("  {}", kv(&ui_ctx, "Database", &db_path)));
            print(
                &ui_ctx,
                &format!("  {}", kv(&ui_ctx, "Schema", &schema_version.to_string())),
            );
            if wrote_config {
                print(
                    &ui_ctx,
                    &format!("  {}", kv(&ui_ctx, "Config", &config_path.display().to_string())),
                );
            }
            blank_line(&ui_ctx);
            print(
                &ui_ctx,
                &hint(&ui_ctx, "tally account add Assets --currency USD"),
            );
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("status=ok");
            println!("created={}", !existed);
            println!("data_dir={}", data_dir);
            println!("db_path={}", db_path);
            println!("schema_version={}", schema_version);
            if wrote_config {
                println!("config_path={}", config_path.display());
            }
        }
    }
    Ok(())
}

pub fn handle_delete_db(ctx: &AppContext, args: &DeleteDbArgs) -> anyhow::Result<()> {
    let user_data = ctx.user_data()?;
    let ui_ctx = ctx.ui_context(false, None)?;
    let db_path = user_data.db_path();

    if !user_data.db_exists() {
        return Err(CliError::not_found(
            format!("No database found at {}", db_path.display()),
            "Nothing to delete",
        )
        .into());
    }

    if !args.yes {
        if !ui_ctx.is_interactive() {
            return Err(CliError::invalid_input(
                "Refusing to delete the database without confirmation",
            )
            .with_hint("Pass --yes to delete non-interactively")
            .into());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {}? Imported statement files are kept.",
                db_path.display()
            ))
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

    let deleted = user_data.delete_db()?;

    if !ctx.quiet() {
        match ui_ctx.mode {
            OutputMode::Pretty => {
                print(
                    &ui_ctx,
                    &badge(
                        &ui_ctx,
                        Badge::Ok,
                        &format!("Deleted {}", db_path.display()),
                    ),
                );
                print(&ui_ctx, &hint(&ui_ctx, "tally init"));
            }
            OutputMode::Plain | OutputMode::Json => {
                println!("status=ok");
                println!("deleted={}", deleted);
                println!("db_path={}", db_path.display());
            }
        }
    }
    Ok(())
}
