use crate::error::AuthError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

pub const DEFAULT_PORT_START: u16 = 8031;
pub const MAX_PORT_ATTEMPTS: u16 = 100;

const SUCCESS_HTML: &str = "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>Authentication Successful</title></head>\
<body><h1>Authentication successful</h1>\
<p>You have authorized crosspost. You can close this window and return to your terminal.</p>\
</body></html>";

const ERROR_HTML: &str = "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>Authentication Error</title></head>\
<body><h1>Authentication failed</h1>\
<p>The authorization did not complete. Close this window and check your terminal.</p>\
</body></html>";

/// Single-use local listener for the installed-app redirect. Bound before
/// the consent flow opens; the socket is released as soon as the grant
/// arrives (or the bind scan exhausts its attempts).
pub struct CallbackListener {
    listener: TcpListener,
    port: u16,
}

impl CallbackListener {
    /// Bind the first free port in `[start_port, start_port + max_attempts)`.
    /// Exhausting the range is fatal for this run and performs no network
    /// calls.
    pub async fn bind(start_port: u16, max_attempts: u16) -> Result<Self, AuthError> {
        for port in start_port..start_port.saturating_add(max_attempts) {
            match TcpListener::bind(("127.0.0.1", port)).await {
                Ok(listener) => {
                    tracing::debug!(port, "callback listener bound");
                    return Ok(Self { listener, port });
                }
                Err(_) => continue,
            }
        }
        Err(AuthError::NoAvailablePort)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.port)
    }

    /// Block until the provider redirects back, then return the
    /// authorization code. Consumes the listener; the socket is dropped on
    /// return.
    pub async fn wait_for_grant(self, expected_state: &str) -> Result<String, AuthError> {
        let (mut stream, _) = self.listener.accept().await?;

        let mut buf = vec![0u8; 4096];
        let mut request = String::new();
        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            request.push_str(&String::from_utf8_lossy(&buf[..n]));
            if request.contains("\r\n") {
                break;
            }
        }

        let grant = parse_grant(&request, expected_state);

        let (status, body) = match &grant {
            Ok(_) => ("200 OK", SUCCESS_HTML),
            Err(_) => ("400 Bad Request", ERROR_HTML),
        };
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await.ok();

        grant
    }
}

/// Extract the authorization code from the redirect request line,
/// rejecting provider errors and CSRF state mismatches.
fn parse_grant(request: &str, expected_state: &str) -> Result<String, AuthError> {
    let request_line = request
        .lines()
        .next()
        .ok_or_else(|| AuthError::OAuth("empty callback request".to_string()))?;

    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AuthError::OAuth("malformed callback request".to_string()))?;

    let url = Url::parse(&format!("http://localhost{target}"))
        .map_err(|e| AuthError::OAuth(format!("malformed callback target: {e}")))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "state" => state = Some(value.to_string()),
            "error" => {
                return Err(AuthError::OAuth(format!("provider returned error: {value}")));
            }
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::OAuth("state parameter mismatch".to_string()));
    }

    code.ok_or_else(|| AuthError::OAuth("callback carried no authorization code".to_string()))
}
