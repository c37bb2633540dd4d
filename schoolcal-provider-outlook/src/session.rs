//! Cached Microsoft OAuth tokens for the Graph API.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_config::{AppConfig, base_dir};

/// Refresh a little before the server-side expiry.
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token endpoint response (authorization code and refresh grants).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

impl SessionData {
    /// Microsoft may omit the refresh token on refresh; keep the old one.
    pub fn from_response(response: TokenResponse, previous_refresh_token: Option<&str>) -> Result<Self> {
        let refresh_token = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous_refresh_token.map(str::to_string))
            .context("Token response carried no refresh token (is offline_access granted?)")?;

        Ok(SessionData {
            access_token: response.access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SKEW_SECONDS) >= self.expires_at
    }
}

pub struct Session {
    path: PathBuf,
    data: SessionData,
}

impl Session {
    pub fn default_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("token.toml"))
    }

    pub fn new(path: PathBuf, data: SessionData) -> Self {
        Session { path, data }
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    /// `None` when no token cache exists yet (interactive consent needed).
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Outlook session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse Outlook session from {}", path.display()))?;

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

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    pub fn is_expired(&self) -> bool {
        self.data.is_expired()
    }

    pub async fn refresh(&mut self, app: &AppConfig, http: &reqwest::Client) -> Result<()> {
        debug!("refreshing Outlook access token");

        let mut form = vec![
            ("client_id", app.client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", self.data.refresh_token.as_str()),
            ("scope", crate::auth::SCOPES),
        ];
        if let Some(secret) = app.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        let response = http
            .post(app.token_endpoint())
            .form(&form)
            .send()
            .await
            .context("Failed to send token refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Failed to refresh Outlook token (sign in again by deleting {}): {}",
                self.path.display(),
                error_text
            );
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        self.data = SessionData::from_response(tokens, Some(&self.data.refresh_token))?;
        self.save()
    }
}
