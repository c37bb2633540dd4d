//! OAuth client secret for the Google adapter.
//!
//! Read from ~/.config/schoolcal/google/credentials.json, either the file
//! downloaded from the Google Cloud console or a flat object.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: Credentials },
    Web { web: Credentials },
    Flat(Credentials),
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("schoolcal")
        .join("google"))
}

impl Credentials {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("credentials.json");

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                Download an OAuth client (Desktop app) from\n\
                https://console.cloud.google.com/apis/credentials\n\
                and save it as {}",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let file: CredentialsFile = serde_json::from_str(contents)?;
        Ok(match file {
            CredentialsFile::Installed { installed } => installed,
            CredentialsFile::Web { web } => web,
            CredentialsFile::Flat(creds) => creds,
        })
    }
}
