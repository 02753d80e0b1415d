//! PlanPal terminal client
//!
//! This crate provides the `planpal` command-line interface: the session
//! store, the chat controller, terminal rendering and the commands.

pub mod app;
pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod secret;
pub mod store;

pub use app::{App, Screen, SendOutcome};
pub use bootstrap::Bootstrap;
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use store::{FileSessionStore, MemorySessionStore, SessionRepository, StoreError};
