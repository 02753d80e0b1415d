//! Sign-in: Google consent followed by the backend code exchange.

use planpal_core::AuthPayload;
use thiserror::Error;
use tracing::{error, info};

use crate::error::BackendError;
use crate::exchange::AuthExchange;
use crate::oauth::Authorizer;

/// Why a sign-in attempt did not produce a session.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Google consent failed: cancelled, denied, timed out or malformed.
    #[error("Google sign-in failed: {0}")]
    Provider(#[source] BackendError),

    /// The backend did not accept the authorization code.
    #[error("code exchange failed: {0}")]
    Exchange(#[source] BackendError),
}

/// Runs one sign-in attempt.
///
/// A failed attempt is logged and returned; it is never retried. Persisting
/// the resulting payload is the caller's job.
#[derive(Debug)]
pub struct Login<P, E> {
    authorizer: P,
    exchange: E,
}

impl<P: Authorizer, E: AuthExchange> Login<P, E> {
    /// Creates a sign-in flow from its two collaborators.
    pub fn new(authorizer: P, exchange: E) -> Self {
        Self {
            authorizer,
            exchange,
        }
    }

    /// Runs consent and exchange, returning the session payload.
    pub async fn sign_in(&self) -> Result<AuthPayload, LoginError> {
        let code = self.authorizer.authorize().await.map_err(|e| {
            error!(error = %e, "Google sign-in failed");
            LoginError::Provider(e)
        })?;

        let payload = self.exchange.exchange(&code).await.map_err(|e| {
            error!(error = %e, "failed to exchange authorization code");
            LoginError::Exchange(e)
        })?;

        info!(user = %payload.user.email, "signed in");
        Ok(payload)
    }
}
