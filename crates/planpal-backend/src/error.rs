//! Error types for backend calls.
//!
//! Every request this crate makes (agent chat, code exchange, Google consent)
//! reports failures as a [`BackendError`] carrying a coarse
//! [`BackendErrorCode`], the HTTP status when there was one, and a message.

use std::fmt;
use thiserror::Error;

/// The category of a backend error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorCode {
    /// Connection failed, timed out, or the body could not be read.
    Network,
    /// The server answered with a non-success status.
    Server,
    /// The server rejected the credentials, or the user denied consent.
    Authentication,
    /// The response body did not have the expected shape.
    InvalidResponse,
    /// Missing or invalid configuration (endpoint, client id, redirect URI).
    Configuration,
    /// Unexpected local failure.
    Internal,
}

impl BackendErrorCode {
    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Server => "server_error",
            Self::Authentication => "authentication_failed",
            Self::InvalidResponse => "invalid_response",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to a remote collaborator.
#[derive(Debug, Error)]
pub struct BackendError {
    code: BackendErrorCode,
    message: String,
    /// HTTP status of the failed response, if one was received.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    /// Creates a new error with the given code and message.
    pub fn new(code: BackendErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::Network, message)
    }

    /// Creates a server error for a non-success HTTP status.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::Server, message).with_status(status)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::Authentication, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::Configuration, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::Internal, message)
    }

    /// Sets the HTTP status for this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> BackendErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Maps a transport failure from reqwest.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timeout".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            format!("request failed: {}", err)
        };
        Self::network(message).with_source(err)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

/// A specialized Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_names() {
        assert_eq!(BackendErrorCode::Network.as_str(), "network_error");
        assert_eq!(
            BackendErrorCode::Authentication.to_string(),
            "authentication_failed"
        );
    }

    #[test]
    fn server_error_carries_status() {
        let err = BackendError::server(500, "agent failed");
        assert_eq!(err.code(), BackendErrorCode::Server);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "server_error: agent failed (HTTP 500)");
    }

    #[test]
    fn error_without_status_display() {
        let err = BackendError::network("connection refused");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "network_error: connection refused");
    }

    #[test]
    fn error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("socket closed");
        let err = BackendError::internal("callback failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
