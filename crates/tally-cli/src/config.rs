use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Contents of `config.toml`. Every section and key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub ui: UiSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSection {
    /// Overrides the XDG data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSection {
    /// Currency used when `account add` gets no `--currency`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSection {
    /// tracing level or filter directive, e.g. "info"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl TallyConfig {
    /// Config written by `tally init` for a freshly created data directory.
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self {
            data: DataSection {
                dir: Some(data_dir.to_string_lossy().to_string()),
            },
            ..Self::default()
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<TallyConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Read the config if the file exists, defaults otherwise.
pub fn read_config_or_default(path: &Path) -> anyhow::Result<TallyConfig> {
    if path.exists() {
        read_config(path)
    } else {
        Ok(TallyConfig::default())
    }
}

pub fn write_config(path: &Path, config: &TallyConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("tally"));
        }
    }
    Ok(home_dir()?.join(".config").join("tally"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
