//! Client for the chat agent endpoint.
//!
//! The agent is an opaque remote service: it receives the user's message,
//! does whatever calendar work it decides on, and answers with a text reply.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::BoxFuture;
use crate::error::{BackendError, BackendResult};

/// Path of the agent endpoint, relative to the backend base URL.
const AGENT_PATH: &str = "agent";

/// Request body sent to the agent.
#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    message: &'a str,
}

/// Response body returned by the agent.
///
/// `response` is optional on the wire; callers decide what to show when the
/// agent answered successfully but without text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentReply {
    /// The assistant's answer.
    #[serde(default)]
    pub response: Option<String>,
}

/// Sends chat messages to the agent.
pub trait AgentApi: Send + Sync {
    /// Sends `message` on behalf of the holder of `token`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, on any non-2xx status, and when the body
    /// is not a JSON object.
    fn send<'a>(&'a self, token: &'a str, message: &'a str)
    -> BoxFuture<'a, BackendResult<AgentReply>>;
}

impl<T: AgentApi + ?Sized> AgentApi for Box<T> {
    fn send<'a>(
        &'a self,
        token: &'a str,
        message: &'a str,
    ) -> BoxFuture<'a, BackendResult<AgentReply>> {
        (**self).send(token, message)
    }
}

/// HTTP implementation of [`AgentApi`].
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl HttpAgentClient {
    /// Creates a client for the agent hosted under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint URL cannot be built or
    /// the HTTP client cannot be created.
    pub fn new(base_url: &Url, timeout: Duration) -> BackendResult<Self> {
        let endpoint = join_endpoint(base_url, AGENT_PATH)?;
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BackendError::configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    /// Returns the agent endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, token: &str, message: &str) -> BackendResult<AgentReply> {
        debug!(endpoint = %self.endpoint, "sending message to agent");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(&AgentRequest { message })
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!("agent rejected the session token");
            return Err(BackendError::authentication("session token rejected by agent")
                .with_status(status.as_u16()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::server(
                status.as_u16(),
                format!("agent error: {}", body.trim()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("failed to read response: {}", e)))?;

        let reply: AgentReply = serde_json::from_str(&body).map_err(|e| {
            BackendError::invalid_response(format!("invalid agent response: {}", e))
        })?;

        debug!(has_response = reply.response.is_some(), "agent replied");
        Ok(reply)
    }
}

impl AgentApi for HttpAgentClient {
    fn send<'a>(
        &'a self,
        token: &'a str,
        message: &'a str,
    ) -> BoxFuture<'a, BackendResult<AgentReply>> {
        Box::pin(self.post(token, message))
    }
}

/// Joins an endpoint path onto a base URL, keeping any base path prefix.
pub(crate) fn join_endpoint(base_url: &Url, path: &str) -> BackendResult<Url> {
    if base_url.cannot_be_a_base() {
        return Err(BackendError::configuration(format!(
            "backend URL `{}` cannot be used as a base",
            base_url
        )));
    }

    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }

    base.join(path).map_err(|e| {
        BackendError::configuration(format!("invalid endpoint `{}`: {}", path, e))
    })
}
