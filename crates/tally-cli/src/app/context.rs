//! Per-invocation state shared by the command handlers.
//!
//! Config and the data directory are resolved lazily so commands such as
//! `completions` never touch the filesystem.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use tally_core::{SqliteStorage, TallyError, UserData};

use crate::cli::Cli;
use crate::config::{read_config_or_default, TallyConfig};
use crate::errors::CliError;
use crate::ui::{OutputFormat, UiContext};

use super::resolver::{missing_db_message, resolve_config_path, resolve_user_data};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config_path: OnceCell<PathBuf>,
    config: OnceCell<TallyConfig>,
    user_data: OnceCell<UserData>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config_path: OnceCell::new(),
            config: OnceCell::new(),
            user_data: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn config_path(&self) -> anyhow::Result<&PathBuf> {
        self.config_path.get_or_try_init(resolve_config_path)
    }

    /// The config file, or defaults when there is none.
    pub fn config(&self) -> anyhow::Result<&TallyConfig> {
        self.config
            .get_or_try_init(|| read_config_or_default(self.config_path()?))
    }

    pub fn user_data(&self) -> anyhow::Result<&UserData> {
        self.user_data.get_or_try_init(|| {
            resolve_user_data(self.cli.data_dir.as_deref(), self.config()?)
        })
    }

    /// Open the existing database; points at `tally init` when missing.
    pub fn open_storage(&self) -> anyhow::Result<SqliteStorage> {
        let user_data = self.user_data()?;
        match user_data.open_db() {
            Ok(storage) => Ok(storage),
            Err(TallyError::NotFound(_)) => Err(CliError::not_found(
                missing_db_message(&user_data.db_path()),
                "Run `tally init` or pass --data-dir",
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Output context for one command, honoring the global flags.
    pub fn ui_context(&self, json: bool, format: Option<&str>) -> anyhow::Result<UiContext> {
        let format = format
            .map(|f| f.parse::<OutputFormat>())
            .transpose()
            .map_err(CliError::invalid_input)?;
        Ok(UiContext::from_env(
            json,
            format,
            self.cli.no_color,
            self.cli.ascii,
        ))
    }

    /// `[ui] default_currency`, if configured.
    pub fn default_currency(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .config()?
            .ui
            .default_currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string))
    }
}
