//! Creates a valid Google session (access token) that we can use to call the gcal API

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_config::{Credentials, base_dir};
use crate::auth::redirect_uri;

pub struct Session {
    path: PathBuf,
    data: SessionData,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl SessionData {
    /// Google typically doesn't return a new refresh_token on refresh.
    pub fn from_access_token(tokens: &AccessToken, previous_refresh_token: Option<&str>) -> Self {
        let refresh_token = if tokens.refresh_token.is_empty() {
            previous_refresh_token.unwrap_or_default().to_string()
        } else {
            tokens.refresh_token.clone()
        };

        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }
}

impl Session {
    pub fn default_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("token.toml"))
    }

    pub fn new(path: PathBuf, data: SessionData) -> Self {
        Session { path, data }
    }

    /// `None` when no token cache exists yet (interactive consent needed).
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read Google OAuth session from {}", path.display())
        })?;

        let data: SessionData = toml::from_str(&contents).with_context(|| {
            format!("Failed to parse Google OAuth session from {}", path.display())
        })?;

        Ok(Some(Session {
            path: path.to_path_buf(),
            data,
        }))
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Set to owner-only (0600) since file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    pub fn client(&self, creds: &Credentials) -> Client {
        Client::new(
            creds.client_id.clone(),
            creds.client_secret.clone(),
            redirect_uri(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        )
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    pub async fn refresh(&mut self, creds: &Credentials) -> Result<()> {
        debug!("refreshing Google access token");

        let client = self.client(creds);
        let tokens = client
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        self.data = SessionData::from_access_token(&tokens, Some(&self.data.refresh_token));
        self.save()
    }
}
