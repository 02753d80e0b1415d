//! Authenticated-user context.
//!
//! A [`Session`] is created from the [`AuthPayload`] the backend returns after
//! a successful Google code exchange, and lives until the user logs out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, as returned by the backend.
///
/// Only `name` and `email` are interpreted. Any other profile fields the
/// backend sends (picture, locale, ...) are kept untouched so that a stored
/// user round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Display name, e.g. "Ada Lovelace".
    #[serde(default)]
    pub name: String,

    /// Primary email address; also the id of the user's primary calendar.
    #[serde(default)]
    pub email: String,

    /// Additional profile fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl User {
    /// Creates a user with a name and email and no extra fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Returns the first word of the display name, if there is one.
    pub fn first_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }
}

/// Response body of the OAuth exchange endpoint: `{token, user}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Opaque application token used as a bearer credential.
    pub token: String,
    /// Profile of the user that signed in.
    pub user: User,
}

/// The active authenticated session.
///
/// The token is opaque to the client; it is only ever forwarded as a bearer
/// credential to the agent endpoint.
#[derive(Clone, PartialEq)]
pub struct Session {
    token: String,
    user: User,
}

impl Session {
    /// Creates a session from a token and a user.
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Returns the bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the signed-in user.
    pub fn user(&self) -> &User {
        &self.user
    }
}

impl From<AuthPayload> for Session {
    fn from(payload: AuthPayload) -> Self {
        Self::new(payload.token, payload.user)
    }
}

// Keeps tokens out of logs and panic messages.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}
