use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use tally_core::VERSION;

/// Tally - a chart of accounts and statement register for personal finances
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding tally.db and imported statements
    #[arg(long, global = true, env = "TALLY_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log detail (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,
}

/// Arguments for the `delete-db` command
#[derive(Args)]
pub struct DeleteDbArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `migrations` command
#[derive(Args)]
pub struct MigrationsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `account add`
#[derive(Args)]
pub struct AccountAddArgs {
    /// Account name (unique among its siblings)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Settlement currency code (defaults to [ui] default_currency)
    #[arg(long, value_name = "CODE")]
    pub currency: Option<String>,

    /// Parent account (UUID or colon path)
    #[arg(long, value_name = "ACCOUNT")]
    pub parent: Option<String>,

    /// Free-text note
    #[arg(long)]
    pub note: Option<String>,
}

/// Arguments for `account list`
#[derive(Args)]
pub struct AccountListArgs {
    /// Include closed accounts
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for `account tree`
#[derive(Args)]
pub struct AccountTreeArgs {
    /// Include closed accounts
    #[arg(long)]
    pub all: bool,
}

/// Arguments for `account show`
#[derive(Args)]
pub struct AccountShowArgs {
    /// Account (UUID or colon path)
    #[arg(value_name = "ACCOUNT")]
    pub account: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `account rename`
#[derive(Args)]
pub struct AccountRenameArgs {
    /// Account (UUID or colon path)
    #[arg(value_name = "ACCOUNT")]
    pub account: String,

    /// New name
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for commands that act on one account
#[derive(Args)]
pub struct AccountRefArgs {
    /// Account (UUID or colon path)
    #[arg(value_name = "ACCOUNT")]
    pub account: String,
}

/// Arguments for `account delete`
#[derive(Args)]
pub struct AccountDeleteArgs {
    /// Account (UUID or colon path)
    #[arg(value_name = "ACCOUNT")]
    pub account: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Create an account
    Add(AccountAddArgs),

    /// List accounts
    List(AccountListArgs),

    /// Show the chart of accounts as a tree
    Tree(AccountTreeArgs),

    /// Show one account
    Show(AccountShowArgs),

    /// Rename an account
    Rename(AccountRenameArgs),

    /// Close an account (kept for history)
    Close(AccountRefArgs),

    /// Reopen a closed account
    Reopen(AccountRefArgs),

    /// Delete an account with no children and no statements
    Delete(AccountDeleteArgs),
}

/// Arguments for `statement import`
#[derive(Args)]
pub struct StatementImportArgs {
    /// Statement file to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Account the statement belongs to (UUID or colon path)
    #[arg(long, value_name = "ACCOUNT")]
    pub account: String,

    /// Issuing institution
    #[arg(long, value_name = "NAME")]
    pub institution: String,

    /// First day covered (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: String,

    /// Last day covered (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: String,

    /// Statement currency (defaults to the account's currency)
    #[arg(long, value_name = "CODE")]
    pub currency: Option<String>,

    /// Statement this import supersedes (UUID or ID prefix)
    #[arg(long, value_name = "ID")]
    pub replaces: Option<String>,
}

/// Arguments for `statement list`
#[derive(Args)]
pub struct StatementListArgs {
    /// Only statements for this account (UUID or colon path)
    #[arg(long, value_name = "ACCOUNT")]
    pub account: Option<String>,

    /// Include superseded statements
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for `statement supersede`
#[derive(Args)]
pub struct StatementSupersedeArgs {
    /// Statement being replaced (UUID or ID prefix)
    #[arg(value_name = "OLD")]
    pub old: String,

    /// Replacement statement (UUID or ID prefix)
    #[arg(value_name = "NEW")]
    pub new: String,
}

/// Arguments for `statement history`
#[derive(Args)]
pub struct StatementHistoryArgs {
    /// Statement (UUID or ID prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum StatementCommand {
    /// Copy a statement file into the store and record it
    Import(StatementImportArgs),

    /// List statements
    List(StatementListArgs),

    /// Mark a statement as replaced by a newer one
    Supersede(StatementSupersedeArgs),

    /// Show the replacement chain of a statement
    History(StatementHistoryArgs),
}

/// Arguments for the `form` command
#[derive(Args)]
pub struct FormArgs {
    /// Describe the form as JSON instead of drawing it
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a migrated database
    Init,

    /// Delete the database file
    #[command(name = "delete-db")]
    DeleteDb(DeleteDbArgs),

    /// Show schema migrations and when they were applied
    Migrations(MigrationsArgs),

    /// Check database integrity
    Check,

    /// Manage the chart of accounts
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },

    /// Import and track institution statements
    Statement {
        #[command(subcommand)]
        command: StatementCommand,
    },

    /// Show the transaction entry form
    Form(FormArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
