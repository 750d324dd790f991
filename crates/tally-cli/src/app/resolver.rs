//! Path resolution for the config file and data directory.

use std::path::{Path, PathBuf};

use tally_core::UserData;

use crate::config::{default_config_path, TallyConfig};
use crate::constants::CONFIG_ENV;

/// `TALLY_CONFIG` if set, otherwise the XDG config location.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// `--data-dir` / `TALLY_DATA_DIR`, then `[data] dir`, then the XDG data
/// directory.
pub fn resolve_user_data(flag: Option<&Path>, config: &TallyConfig) -> anyhow::Result<UserData> {
    if let Some(dir) = flag {
        return Ok(UserData::from_data_dir(dir));
    }
    if let Some(dir) = config.data.dir.as_deref().filter(|d| !d.trim().is_empty()) {
        return Ok(UserData::from_data_dir(expand_home(dir)));
    }
    Ok(UserData::from_environment()?)
}

/// Expand a leading `~/` using `HOME`.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

pub fn missing_db_message(db_path: &Path) -> String {
    format!("No database found at {}", db_path.display())
}
