//! Client error types.

use std::fmt;

use planpal_backend::{BackendError, LoginError};
use planpal_core::CalendarError;

use crate::store::StoreError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// IO error.
    Io(std::io::Error),
    /// Session storage error.
    Store(StoreError),
    /// Sign-in failed.
    Login(LoginError),
    /// Backend request failed.
    Backend(BackendError),
    /// No calendar can be shown.
    Calendar(CalendarError),
    /// The command needs a signed-in session.
    AuthRequired(String),
    /// No route matches the path.
    UnknownRoute(String),
    /// Action failed (open in browser, etc).
    Action(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Store(err) => write!(f, "{}", err),
            Self::Login(err) => write!(f, "{}", err),
            Self::Backend(err) => write!(f, "backend error: {}", err),
            Self::Calendar(err) => write!(f, "calendar unavailable: {}", err),
            Self::AuthRequired(msg) => write!(f, "authentication required: {}", msg),
            Self::UnknownRoute(path) => write!(
                f,
                "no page at `{}` (known pages: {})",
                path,
                planpal_core::Route::ALL
                    .iter()
                    .map(|r| r.path())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Action(msg) => write!(f, "action failed: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Login(err) => Some(err),
            Self::Backend(err) => Some(err),
            Self::Calendar(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<LoginError> for ClientError {
    fn from(err: LoginError) -> Self {
        Self::Login(err)
    }
}

impl From<BackendError> for ClientError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}

impl From<CalendarError> for ClientError {
    fn from(err: CalendarError) -> Self {
        Self::Calendar(err)
    }
}
