//! Interactive consent against the Microsoft identity platform.

use anyhow::{Context, Result};
use schoolcal_core::oauth;
use tracing::info;

use crate::app_config::AppConfig;
use crate::session::{Session, SessionData, TokenResponse};

pub const SCOPES: &str = "offline_access Calendars.ReadWrite";

const REDIRECT_PORT: u16 = 8086;

pub fn redirect_uri() -> String {
    oauth::redirect_uri(REDIRECT_PORT)
}

pub fn consent_url(app: &AppConfig, state: &str) -> Result<url::Url> {
    let url = url::Url::parse_with_params(
        &app.authorize_endpoint(),
        &[
            ("client_id", app.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri().as_str()),
            ("response_mode", "query"),
            ("scope", SCOPES),
            ("state", state),
        ],
    )?;
    Ok(url)
}

/// Load the cached session, refreshing it if expired, or run the
/// browser consent flow when there is no cache yet.
pub async fn load_or_authorize(app: &AppConfig, http: &reqwest::Client) -> Result<Session> {
    let path = Session::default_path()?;

    match Session::load(&path)? {
        Some(mut session) => {
            if session.is_expired() {
                session.refresh(app, http).await?;
            }
            Ok(session)
        }
        None => {
            let data = authorize(app, http).await?;
            let session = Session::new(path, data);
            session.save()?;
            Ok(session)
        }
    }
}

async fn authorize(app: &AppConfig, http: &reqwest::Client) -> Result<SessionData> {
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = consent_url(app, &state)?;

    eprintln!("\nOpen this URL in your browser to sign in to Outlook:\n");
    eprintln!("{}\n", auth_url);

    if open::that(auth_url.as_str()).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let callback = oauth::wait_for_callback(REDIRECT_PORT).await?;
    if callback.state != state {
        anyhow::bail!("OAuth state mismatch, aborting sign-in");
    }

    info!("received Outlook authorization code");

    let redirect = redirect_uri();
    let mut form = vec![
        ("client_id", app.client_id.as_str()),
        ("grant_type", "authorization_code"),
        ("code", callback.code.as_str()),
        ("redirect_uri", redirect.as_str()),
        ("scope", SCOPES),
    ];
    if let Some(secret) = app.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }

    let response = http
        .post(app.token_endpoint())
        .form(&form)
        .send()
        .await
        .context("Failed to exchange authorization code")?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Outlook token exchange failed: {}", error_text);
    }

    let tokens: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;

    eprintln!("Outlook authentication successful!");

    SessionData::from_response(tokens, None)
}
