//! Application wiring.
//!
//! [`Bootstrap`] resolves the deployment configuration once (OAuth client
//! id, backend location, session directory) and hands out the collaborators
//! every command needs. It also owns the route table: `/` is the chat and
//! `/privacy` the static policy page.

use planpal_backend::{HttpAgentClient, HttpAuthExchange, Login, LoopbackAuthorizer};
use planpal_core::Route;
use tracing::{debug, warn};

use crate::app::App;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::store::FileSessionStore;

/// The sign-in flow used by the binary.
pub type GoogleLogin = Login<LoopbackAuthorizer, HttpAuthExchange>;

/// The application as wired by the binary.
pub type PlanPalApp = App<FileSessionStore, HttpAgentClient>;

/// Resolved configuration plus the factories built from it.
#[derive(Debug)]
pub struct Bootstrap {
    config: ClientConfig,
    /// Outcome of resolving the client id; an error is kept until sign-in.
    client_id: Result<Option<String>, String>,
}

impl Bootstrap {
    /// Resolves the OAuth client id, preferring `cli_client_id` over the
    /// configuration file.
    ///
    /// Neither a missing client id nor a reference that fails to resolve is
    /// an error here; only signing in needs the id.
    pub fn new(config: ClientConfig, cli_client_id: Option<String>) -> Self {
        let client_id = match cli_client_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
        {
            Some(id) => crate::secret::resolve(&id)
                .map(Some)
                .map_err(|e| format!("failed to resolve --google-client-id: {}", e)),
            None => config.google.resolve_client_id(),
        };

        if let Err(ref e) = client_id {
            warn!(error = %e, "Google client id unavailable");
        }
        debug!(
            has_client_id = matches!(client_id, Ok(Some(_))),
            "bootstrap resolved"
        );
        Self { config, client_id }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns whether a client id is configured, resolvable or not.
    pub fn has_client_id(&self) -> bool {
        !matches!(self.client_id, Ok(None))
    }

    /// Returns the OAuth client id, or an error explaining why there is none.
    pub fn oauth_client_id(&self) -> ClientResult<&str> {
        match self.client_id {
            Ok(Some(ref id)) => Ok(id),
            Ok(None) => Err(ClientError::Config(
                "no Google client id configured; set google.client_id in config.toml, \
                 pass --google-client-id or export PLANPAL_GOOGLE_CLIENT_ID"
                    .to_string(),
            )),
            Err(ref e) => Err(ClientError::Config(e.clone())),
        }
    }

    /// Opens the session store in the configured directory.
    pub fn session_store(&self) -> FileSessionStore {
        FileSessionStore::new(self.config.session_dir())
    }

    /// Builds the agent client.
    pub fn agent(&self) -> ClientResult<HttpAgentClient> {
        let base = self.config.backend_url().map_err(ClientError::Config)?;
        Ok(HttpAgentClient::new(&base, self.config.timeout())?)
    }

    /// Builds the Google sign-in flow.
    pub fn login(&self) -> ClientResult<GoogleLogin> {
        let client_id = self.oauth_client_id()?;
        let redirect_uri = self.config.redirect_uri().map_err(ClientError::Config)?;
        let base = self.config.backend_url().map_err(ClientError::Config)?;

        let authorizer = LoopbackAuthorizer::new(client_id, redirect_uri)?;
        let exchange = HttpAuthExchange::new(&base, self.config.timeout())?;
        Ok(Login::new(authorizer, exchange))
    }

    /// Mounts the application on the stored session.
    pub fn mount_app(&self) -> ClientResult<PlanPalApp> {
        Ok(App::mount(self.session_store(), self.agent()?))
    }

    /// Opens the page behind `path`.
    pub async fn open_path(&self, path: &str) -> ClientResult<()> {
        let route = Route::from_path(path).ok_or_else(|| ClientError::UnknownRoute(path.to_string()))?;
        self.open(route).await
    }

    /// Shows `route`.
    pub async fn open(&self, route: Route) -> ClientResult<()> {
        debug!(route = %route, "opening route");
        match route {
            Route::Home => crate::commands::chat::run(self).await,
            Route::Privacy => crate::commands::privacy::show(),
        }
    }
}
