use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use serde::Deserialize;

/// Which providers to drive, read from `~/.config/schoolcal/config.toml`.
///
/// Every field has a default, so a missing file enables both providers
/// against the primary Google calendar.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub outlook: OutlookConfig,

    #[serde(default)]
    pub google: GoogleConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutlookConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,

    /// Target calendars; `primary` is the account's main calendar
    #[serde(default = "default_calendar_ids")]
    pub calendar_ids: Vec<String>,
}

impl Default for OutlookConfig {
    fn default() -> Self {
        OutlookConfig { enabled: true }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        GoogleConfig {
            enabled: true,
            calendar_ids: default_calendar_ids(),
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_calendar_ids() -> Vec<String> {
    vec![schoolcal_provider_google::DEFAULT_CALENDAR_ID.to_string()]
}

/// Get the config file path (~/.config/schoolcal/config.toml)
pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("schoolcal").join("config.toml"))
}

/// Load the config file if present, then apply `SCHOOLCAL__*` overrides,
/// e.g. `SCHOOLCAL__GOOGLE__CALENDAR_IDS=primary,family@group.calendar.google.com`.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    let settings = config::Config::builder()
        .add_source(File::from(path.clone()).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("SCHOOLCAL")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("google.calendar_ids")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let cfg: Config = settings
        .try_deserialize()
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse a config file's contents without touching the environment.
#[cfg(test)]
pub fn from_toml_str(contents: &str) -> Result<Config> {
    let cfg: Config = config::Config::builder()
        .add_source(File::from_str(contents, FileFormat::Toml))
        .build()?
        .try_deserialize()
        .context("Invalid config")?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.google.enabled && self.google.calendar_ids.is_empty() {
            anyhow::bail!("google.calendar_ids must name at least one calendar when Google is enabled");
        }
        Ok(())
    }
}
