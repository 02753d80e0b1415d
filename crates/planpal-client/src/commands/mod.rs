//! Command implementations.

pub mod auth;
pub mod calendar;
pub mod chat;
pub mod config;
pub mod privacy;
pub mod send;

use tracing::info;

use crate::error::{ClientError, ClientResult};

/// Opens `url` in the default browser.
pub fn open_in_browser(url: &str) -> ClientResult<()> {
    info!(url = %url, "opening in browser");
    open::that(url).map_err(|e| ClientError::Action(format!("failed to open URL: {}", e)))
}
