//! planpal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use planpal_core::{Route, init_tracing};

use planpal_client::cli::{AuthAction, Cli, Command, ConfigAction};
use planpal_client::commands;
use planpal_client::config::ClientConfig;
use planpal_client::error::{ClientError, ClientResult};
use planpal_client::Bootstrap;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Read before logging starts so `debug = true` in config.toml applies.
    let config = load_config(&cli);
    let tracing_config = match config {
        Ok(ref config) => config.tracing(cli.debug),
        Err(_) => ClientConfig::default().tracing(cli.debug),
    };
    if let Err(e) = init_tracing(tracing_config.with_format(cli.log_format)) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
    .map_err(ClientError::Config)?;

    if let Some(ref url) = cli.backend_url {
        config.backend.base_url = url.clone();
    }
    Ok(config)
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    let bootstrap = Bootstrap::new(config, cli.google_client_id);

    match cli.command {
        None | Some(Command::Chat) => bootstrap.open(Route::Home).await,
        Some(Command::Open { path }) => bootstrap.open_path(&path).await,
        Some(Command::Privacy) => bootstrap.open(Route::Privacy).await,
        Some(Command::Send { message }) => commands::send::run(&bootstrap, &message).await,
        Some(Command::Calendar { open, html }) => commands::calendar::show(&bootstrap, open, html),
        Some(Command::Auth { action }) => match action {
            AuthAction::Login { force } => commands::auth::login(&bootstrap, force).await,
            AuthAction::Logout => {
                commands::auth::logout(&bootstrap.session_store(), &mut std::io::stdout())
            }
            AuthAction::Status => {
                commands::auth::status(&bootstrap.session_store(), &mut std::io::stdout())
            }
        },
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(bootstrap.config()),
            ConfigAction::Validate => commands::config::validate(&bootstrap),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
