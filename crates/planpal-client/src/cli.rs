//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use planpal_core::TracingOutputFormat;

/// planpal - chat with your calendar assistant
#[derive(Debug, Parser)]
#[command(name = "planpal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "PLANPAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format (pretty, compact, json)
    #[arg(long, default_value = "compact")]
    pub log_format: TracingOutputFormat,

    /// Google OAuth client ID (overrides config.toml)
    #[arg(long, env = "PLANPAL_GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// Backend base URL (overrides config.toml)
    #[arg(long, env = "PLANPAL_BACKEND_URL")]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a page by path (`/` or `/privacy`)
    Open {
        /// Route path
        path: String,
    },

    /// Start the interactive chat
    Chat,

    /// Send a single message and print the reply
    Send {
        /// Message text
        message: String,
    },

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Show the embedded calendar of the signed-in user
    Calendar {
        /// Open the calendar in the browser
        #[arg(long)]
        open: bool,

        /// Print the iframe markup instead of the URL
        #[arg(long, conflicts_with = "open")]
        html: bool,
    },

    /// Show the privacy policy
    Privacy,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authentication actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Sign in with Google
    Login {
        /// Sign in again even if a session exists
        #[arg(long)]
        force: bool,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Status,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the current configuration
    Dump,

    /// Validate the configuration
    Validate,

    /// Show configuration file path
    Path,
}
