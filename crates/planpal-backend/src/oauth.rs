//! Google OAuth 2.0 authorization-code flow with a loopback redirect.
//!
//! The client never sees Google tokens. It only collects the authorization
//! code and hands it to the backend, which performs the token exchange with
//! its own client secret.
//!
//! # Flow Overview
//!
//! 1. Generate a random `state` value
//! 2. Bind a local HTTP listener on the host/port of the fixed redirect URI
//! 3. Open the user's browser to Google's consent page
//! 4. User grants permission; Google redirects to the listener
//! 5. Verify `state` and extract the authorization code

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::BoxFuture;
use crate::error::{BackendError, BackendResult};

/// Google's authorization endpoint.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Scope requested from Google: read/write access to the user's calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Default time to wait for the browser to come back.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// How often the callback listener checks for a connection.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Longest wait for the request line of an accepted connection.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Produces an authorization code from the identity provider.
pub trait Authorizer: Send + Sync {
    /// Runs the consent flow and returns the authorization code.
    ///
    /// # Errors
    ///
    /// Fails if the user denies consent, the callback never arrives, or the
    /// callback is malformed.
    fn authorize(&self) -> BoxFuture<'_, BackendResult<String>>;
}

/// A single authorization request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Random value echoed back by Google, checked against CSRF.
    pub state: String,
}

impl AuthRequest {
    /// Creates a request with a fresh random state.
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..16).map(|_| rng.random()).collect();
        Self {
            state: URL_SAFE_NO_PAD.encode(&bytes),
        }
    }

    /// Builds the Google consent URL.
    pub fn consent_url(&self, client_id: &str, redirect_uri: &Url, scope: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            state={}&access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri.as_str()),
            urlencoding::encode(scope),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for AuthRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters of the redirect back from Google.
#[derive(Debug, Default, PartialEq, Eq)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// [`Authorizer`] that opens the browser and listens on the redirect URI.
#[derive(Debug, Clone)]
pub struct LoopbackAuthorizer {
    client_id: String,
    redirect_uri: Url,
    timeout: Duration,
}

impl LoopbackAuthorizer {
    /// Creates an authorizer for `client_id` redirecting to `redirect_uri`.
    ///
    /// # Errors
    ///
    /// The redirect URI must be a plain `http` URL on a loopback host with an
    /// explicit port, since that is where the listener binds.
    pub fn new(client_id: impl Into<String>, redirect_uri: Url) -> BackendResult<Self> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(BackendError::configuration("Google OAuth client id is empty"));
        }

        if redirect_uri.scheme() != "http" {
            return Err(BackendError::configuration(format!(
                "redirect URI `{}` must use http",
                redirect_uri
            )));
        }

        match redirect_uri.host_str() {
            Some("127.0.0.1") | Some("localhost") | Some("[::1]") => {}
            _ => {
                return Err(BackendError::configuration(format!(
                    "redirect URI `{}` must point to a loopback address",
                    redirect_uri
                )));
            }
        }

        if redirect_uri.port().is_none() {
            return Err(BackendError::configuration(format!(
                "redirect URI `{}` must include a port",
                redirect_uri
            )));
        }

        Ok(Self {
            client_id,
            redirect_uri,
            timeout: CALLBACK_TIMEOUT,
        })
    }

    /// Sets how long to wait for the browser redirect.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the redirect URI.
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    fn bind_address(&self) -> BackendResult<String> {
        let host = self
            .redirect_uri
            .host_str()
            .ok_or_else(|| BackendError::configuration("redirect URI has no host"))?;
        let port = self
            .redirect_uri
            .port()
            .ok_or_else(|| BackendError::configuration("redirect URI has no port"))?;
        Ok(format!("{}:{}", host, port))
    }

    fn listen(&self) -> BackendResult<TcpListener> {
        let address = self.bind_address()?;
        let listener = TcpListener::bind(&address).map_err(|e| {
            BackendError::configuration(format!("cannot listen on {}: {}", address, e))
                .with_source(e)
        })?;
        debug!(%address, "bound loopback callback listener");
        Ok(listener)
    }

    async fn run(&self) -> BackendResult<String> {
        let request = AuthRequest::new();

        let listener = self.listen()?;

        let consent_url = request.consent_url(&self.client_id, &self.redirect_uri, CALENDAR_SCOPE);

        info!("starting Google sign-in, opening browser...");
        if let Err(e) = open::that(&consent_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nPlease open this URL in your browser:\n\n{}\n", consent_url);
        }

        let callback_path = self.redirect_uri.path().to_string();
        let timeout = self.timeout;
        let params = tokio::task::spawn_blocking(move || {
            wait_for_callback(listener, &callback_path, timeout)
        })
        .await
        .map_err(|e| BackendError::internal(format!("callback listener failed: {}", e)))??;

        code_from_params(params, &request.state)
    }
}

impl Authorizer for LoopbackAuthorizer {
    fn authorize(&self) -> BoxFuture<'_, BackendResult<String>> {
        Box::pin(self.run())
    }
}

/// Checks the callback parameters and returns the authorization code.
fn code_from_params(params: CallbackParams, expected_state: &str) -> BackendResult<String> {
    if let Some(error) = params.error {
        return Err(BackendError::authentication(format!(
            "authorization denied: {}",
            error
        )));
    }

    if params.state.as_deref() != Some(expected_state) {
        return Err(BackendError::authentication(
            "OAuth state mismatch - possible CSRF attack",
        ));
    }

    params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| BackendError::authentication("missing authorization code in callback"))
}

/// Waits for the browser redirect on `listener`.
///
/// The listener is polled until `timeout` and dropped on return, so the
/// redirect port is free again for the next attempt.
fn wait_for_callback(
    listener: TcpListener,
    callback_path: &str,
    timeout: Duration,
) -> BackendResult<CallbackParams> {
    listener.set_nonblocking(true).map_err(|e| {
        BackendError::internal(format!("cannot poll callback listener: {}", e)).with_source(e)
    })?;
    let deadline = Instant::now() + timeout;

    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                // Accepted sockets may inherit non-blocking mode on some platforms.
                let _ = stream.set_nonblocking(false);
                let _ = stream.set_read_timeout(Some(REQUEST_READ_TIMEOUT));
                if let Some(params) = handle_callback(stream, callback_path) {
                    return Ok(params);
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => error!("failed to accept connection: {}", e),
        }

        if Instant::now() >= deadline {
            return Err(BackendError::authentication(
                "timed out waiting for Google sign-in",
            ));
        }
        thread::sleep(ACCEPT_POLL_INTERVAL);
    }
}

/// Reads one request from the browser and answers it.
///
/// Returns `None` for requests that are not the redirect (favicon, probes).
fn handle_callback(mut stream: TcpStream, callback_path: &str) -> Option<CallbackParams> {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return None;
    }

    let params = parse_request_line(&request_line, callback_path)?;

    let response = if params.error.is_some() || params.code.is_none() {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
        <html><body><h1>PlanPal sign-in failed</h1>\
        <p>You can close this window.</p></body></html>"
    } else {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
        <html><body><h1>Signed in to PlanPal</h1>\
        <p>You can close this window and return to the terminal.</p></body></html>"
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    Some(params)
}

/// Parses `GET <path>?code=..&state=.. HTTP/1.1`.
fn parse_request_line(request_line: &str, callback_path: &str) -> Option<CallbackParams> {
    let mut parts = request_line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let target = parts.next()?;

    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path != callback_path {
        return None;
    }

    let mut params = CallbackParams::default();
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(&value.replace('+', " "))
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match key {
            "code" => params.code = Some(value),
            "state" => params.state = Some(value),
            "error" => params.error = Some(value),
            _ => {}
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendErrorCode;
    use std::io::Read;

    fn redirect(uri: &str) -> Url {
        Url::parse(uri).unwrap()
    }

    #[test]
    fn state_is_random() {
        let a = AuthRequest::new();
        let b = AuthRequest::new();
        assert_ne!(a.state, b.state);
        // 16 bytes, base64 without padding
        assert_eq!(a.state.len(), 22);
    }

    #[test]
    fn consent_url_format() {
        let request = AuthRequest {
            state: "xyz".to_string(),
        };
        let url = request.consent_url(
            "client.apps.googleusercontent.com",
            &redirect("http://127.0.0.1:8765/callback"),
            CALENDAR_SCOPE,
        );

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=client.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8765%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fcalendar"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("access_type=offline"));
    }

    #[test]
    fn redirect_uri_must_be_loopback_with_port() {
        assert!(LoopbackAuthorizer::new("id", redirect("http://127.0.0.1:8765/callback")).is_ok());
        assert!(LoopbackAuthorizer::new("id", redirect("http://localhost:9000/cb")).is_ok());

        let err = LoopbackAuthorizer::new("id", redirect("https://planpal.example.com/cb"))
            .unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Configuration);

        let err = LoopbackAuthorizer::new("id", redirect("http://example.com:8765/cb")).unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Configuration);

        let err = LoopbackAuthorizer::new("id", redirect("http://127.0.0.1/callback")).unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Configuration);

        let err = LoopbackAuthorizer::new(" ", redirect("http://127.0.0.1:8765/callback"))
            .unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Configuration);
    }

    #[test]
    fn parses_callback_request_line() {
        let params = parse_request_line(
            "GET /callback?state=abc&code=4%2F0AbC&scope=x HTTP/1.1\r\n",
            "/callback",
        )
        .unwrap();
        assert_eq!(params.code.as_deref(), Some("4/0AbC"));
        assert_eq!(params.state.as_deref(), Some("abc"));
        assert_eq!(params.error, None);
    }

    #[test]
    fn ignores_other_paths_and_methods() {
        assert_eq!(parse_request_line("GET /favicon.ico HTTP/1.1", "/callback"), None);
        assert_eq!(parse_request_line("POST /callback?code=a HTTP/1.1", "/callback"), None);
        assert_eq!(parse_request_line("", "/callback"), None);
    }

    #[test]
    fn provider_error_wins() {
        let params = CallbackParams {
            code: None,
            state: Some("s".to_string()),
            error: Some("access_denied".to_string()),
        };
        let err = code_from_params(params, "s").unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Authentication);
        assert!(err.message().contains("access_denied"));
    }

    #[test]
    fn state_mismatch_is_rejected() {
        let params = CallbackParams {
            code: Some("code".to_string()),
            state: Some("other".to_string()),
            error: None,
        };
        assert!(code_from_params(params, "expected").is_err());
    }

    #[test]
    fn matching_state_yields_code() {
        let params = CallbackParams {
            code: Some("code".to_string()),
            state: Some("s".to_string()),
            error: None,
        };
        assert_eq!(code_from_params(params, "s").unwrap(), "code");
    }

    #[test]
    fn loopback_listener_receives_redirect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let browser = thread::spawn(move || {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
            stream
                .write_all(b"GET /callback?code=abc&state=s1 HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .unwrap();
            let mut page = String::new();
            let _ = stream.read_to_string(&mut page);
            page
        });

        let params = wait_for_callback(listener, "/callback", Duration::from_secs(5)).unwrap();
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert_eq!(params.state.as_deref(), Some("s1"));

        let page = browser.join().unwrap();
        assert!(page.starts_with("HTTP/1.1 200 OK"));
        assert!(page.contains("return to the terminal"));
    }

    #[test]
    fn loopback_listener_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let err = wait_for_callback(listener, "/callback", Duration::from_millis(50)).unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Authentication);
    }

    #[test]
    fn redirect_port_is_released_after_timeout() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let authorizer = LoopbackAuthorizer::new(
            "id",
            redirect(&format!("http://127.0.0.1:{}/callback", port)),
        )
        .unwrap();

        for _ in 0..2 {
            let listener = authorizer.listen().unwrap();
            let err =
                wait_for_callback(listener, "/callback", Duration::from_millis(100)).unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::Authentication);
        }
    }

    #[test]
    fn stray_requests_do_not_end_the_wait() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let browser = thread::spawn(move || {
            let mut favicon = TcpStream::connect(("127.0.0.1", port)).unwrap();
            favicon.write_all(b"GET /favicon.ico HTTP/1.1\r\n\r\n").unwrap();
            drop(favicon);

            let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
            stream
                .write_all(b"GET /callback?code=late&state=s2 HTTP/1.1\r\n\r\n")
                .unwrap();
            let mut page = String::new();
            let _ = stream.read_to_string(&mut page);
        });

        let params = wait_for_callback(listener, "/callback", Duration::from_secs(5)).unwrap();
        assert_eq!(params.code.as_deref(), Some("late"));
        browser.join().unwrap();
    }
}
