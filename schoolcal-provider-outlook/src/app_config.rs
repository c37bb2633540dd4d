//! App-level configuration for the Outlook adapter.
//!
//! User-provided Azure app registration stored at:
//!   ~/.config/schoolcal/outlook/app_config.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_TENANT: &str = "common";

fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}

/// Azure app registration (user-provided).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    /// Only needed for confidential (web) app registrations
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_tenant")]
    pub tenant: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("schoolcal")
        .join("outlook"))
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("app_config.toml");

        if !path.exists() {
            anyhow::bail!(
                "Outlook app registration not found.\n\n\
                Create {} with:\n\n\
                client_id = \"your-azure-application-id\"\n\
                # tenant = \"common\"\n\n\
                Register a desktop app with redirect URI {} at https://entra.microsoft.com.",
                path.display(),
                crate::auth::redirect_uri()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read Outlook app config from {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse Outlook app config from {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn authorize_endpoint(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/authorize",
            self.tenant
        )
    }

    pub fn token_endpoint(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.tenant
        )
    }
}
