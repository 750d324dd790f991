//! Tally CLI - chart of accounts and statement register
//!
//! Command-line interface over `tally-core`.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod form;
mod helpers;
mod logging;
mod output;
mod ui;

use clap::{CommandFactory, Parser};

use crate::app::AppContext;
use crate::cli::{AccountCommand, Cli, Commands, StatementCommand};
use crate::commands::{accounts, form as form_cmd, init, maintenance, misc, statements};
use crate::errors::CliError;
use crate::ui::UiContext;

fn main() {
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    // A broken config file is reported by the command that needs it.
    let configured_level = ctx
        .config()
        .ok()
        .and_then(|config| config.log.level.clone());
    logging::init_logging(cli.verbose, cli.quiet, configured_level.as_deref());

    if let Err(err) = run(&ctx) {
        tracing::debug!(error = ?err, "command failed");
        let ui_ctx = UiContext::from_env(false, None, cli.no_color, cli.ascii);
        CliError::from_anyhow(&err).exit(&ui_ctx);
    }
}

fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let Some(command) = ctx.cli().command.as_ref() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Init => init::handle_init(ctx),
        Commands::DeleteDb(args) => init::handle_delete_db(ctx, args),
        Commands::Migrations(args) => maintenance::handle_migrations(ctx, args),
        Commands::Check => maintenance::handle_check(ctx),
        Commands::Account { command } => match command {
            AccountCommand::Add(args) => accounts::handle_add(ctx, args),
            AccountCommand::List(args) => accounts::handle_list(ctx, args),
            AccountCommand::Tree(args) => accounts::handle_tree(ctx, args),
            AccountCommand::Show(args) => accounts::handle_show(ctx, args),
            AccountCommand::Rename(args) => accounts::handle_rename(ctx, args),
            AccountCommand::Close(args) => accounts::handle_close(ctx, args),
            AccountCommand::Reopen(args) => accounts::handle_reopen(ctx, args),
            AccountCommand::Delete(args) => accounts::handle_delete(ctx, args),
        },
        Commands::Statement { command } => match command {
            StatementCommand::Import(args) => statements::handle_import(ctx, args),
            StatementCommand::List(args) => statements::handle_list(ctx, args),
            StatementCommand::Supersede(args) => statements::handle_supersede(ctx, args),
            StatementCommand::History(args) => statements::handle_history(ctx, args),
        },
        Commands::Form(args) => form_cmd::handle_form(ctx, args),
        Commands::Completions(args) => misc::handle_completions(args.shell),
    }
}
