//! Interactive consent for Google Calendar.

use anyhow::{Context, Result};
use google_calendar::Client;
use schoolcal_core::oauth;

use crate::app_config::Credentials;
use crate::session::{Session, SessionData};

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

const REDIRECT_PORT: u16 = 8085;

pub fn redirect_uri() -> String {
    oauth::redirect_uri(REDIRECT_PORT)
}

/// Load the cached session, refreshing it if expired, or run the
/// browser consent flow when there is no cache yet.
pub async fn load_or_authorize(creds: &Credentials) -> Result<Session> {
    let path = Session::default_path()?;

    match Session::load(&path)? {
        Some(mut session) => {
            if session.is_expired() {
                session.refresh(creds).await?;
            }
            Ok(session)
        }
        None => {
            let data = authorize(creds).await?;
            let session = Session::new(path, data);
            session.save()?;
            Ok(session)
        }
    }
}

async fn authorize(creds: &Credentials) -> Result<SessionData> {
    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();

    let mut client = Client::new(
        creds.client_id.clone(),
        creds.client_secret.clone(),
        redirect_uri(),
        String::new(),
        String::new(),
    );

    let auth_url = client.user_consent_url(&scopes);

    eprintln!("\nOpen this URL in your browser to authenticate with Google:\n");
    eprintln!("{}\n", auth_url);

    // Try to open the browser automatically
    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let callback = oauth::wait_for_callback(REDIRECT_PORT).await?;

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let tokens = client
        .get_access_token(&callback.code, &callback.state)
        .await
        .context("Failed to exchange authorization code")?;

    if tokens.refresh_token.is_empty() {
        anyhow::bail!("Google did not return a refresh token; revoke access and try again");
    }

    eprintln!("Google authentication successful!");

    Ok(SessionData::from_access_token(&tokens, None))
}
