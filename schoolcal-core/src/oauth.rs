//! Localhost redirect handling for OAuth consent flows.
//!
//! Both providers send the user to a browser and wait for the
//! authorization server to redirect back to a local port with a `code`
//! (and `state`) in the query string.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::error::{SchoolCalError, SchoolCalResult};

pub fn redirect_uri(port: u16) -> String {
    format!("http://localhost:{}/callback", port)
}

pub fn redirect_address(port: u16) -> String {
    format!("127.0.0.1:{}", port)
}

/// Authorization code and state from a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub code: String,
    pub state: String,
}

/// Parse the request line of the redirect, e.g.
/// `GET /callback?code=abc&state=xyz HTTP/1.1`.
pub fn parse_callback(request_line: &str) -> SchoolCalResult<Callback> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| SchoolCalError::Auth("Invalid HTTP request on OAuth callback".into()))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))
        .map_err(|e| SchoolCalError::Auth(format!("Invalid OAuth callback URL: {}", e)))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        let description = param("error_description").unwrap_or_default();
        return Err(SchoolCalError::Auth(format!(
            "Authorization was denied: {} {}",
            error, description
        )));
    }

    let code = param("code").ok_or_else(|| SchoolCalError::Auth("No code in callback".into()))?;

    Ok(Callback {
        code,
        state: param("state").unwrap_or_default(),
    })
}

/// Accept a single redirect on `port` and answer the browser.
pub async fn wait_for_callback(port: u16) -> SchoolCalResult<Callback> {
    let listener = TcpListener::bind(redirect_address(port)).await?;
    let (stream, _) = listener.accept().await?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let callback = parse_callback(&request_line);

    let body = if callback.is_ok() {
        "<h1>Authentication successful!</h1>\
         <p>You can close this window and return to the terminal.</p>"
    } else {
        "<h1>Authentication failed</h1><p>See the terminal for details.</p>"
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html\r\n\
         Connection: close\r\n\
         \r\n\
         <html><body>{}</body></html>",
        body
    );

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    callback
}
