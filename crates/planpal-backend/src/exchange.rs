//! Exchange of a Google authorization code for an application session.

use std::time::Duration;

use planpal_core::AuthPayload;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::BoxFuture;
use crate::agent::join_endpoint;
use crate::error::{BackendError, BackendResult};

/// Path of the exchange endpoint, relative to the backend base URL.
const EXCHANGE_PATH: &str = "auth/google";

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
}

/// Trades an authorization code for `{token, user}`.
pub trait AuthExchange: Send + Sync {
    /// Sends the authorization code to the backend.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx statuses and malformed bodies.
    fn exchange<'a>(&'a self, code: &'a str) -> BoxFuture<'a, BackendResult<AuthPayload>>;
}

/// HTTP implementation of [`AuthExchange`].
#[derive(Debug, Clone)]
pub struct HttpAuthExchange {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl HttpAuthExchange {
    /// Creates an exchange client for the backend hosted under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint URL cannot be built or
    /// the HTTP client cannot be created.
    pub fn new(base_url: &Url, timeout: Duration) -> BackendResult<Self> {
        let endpoint = join_endpoint(base_url, EXCHANGE_PATH)?;
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

    async fn post(&self, code: &str) -> BackendResult<AuthPayload> {
        debug!(endpoint = %self.endpoint, "exchanging authorization code");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&ExchangeRequest { code })
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::server(
                status.as_u16(),
                format!("code exchange failed: {}", body.trim()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("failed to read response: {}", e)))?;

        let payload: AuthPayload = serde_json::from_str(&body).map_err(|e| {
            BackendError::invalid_response(format!("invalid exchange response: {}", e))
        })?;

        info!(email = %payload.user.email, "authorization code exchanged");
        Ok(payload)
    }
}

impl AuthExchange for HttpAuthExchange {
    fn exchange<'a>(&'a self, code: &'a str) -> BoxFuture<'a, BackendResult<AuthPayload>> {
        Box::pin(self.post(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendErrorCode;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn exchange_for(server: &MockServer) -> HttpAuthExchange {
        let base = Url::parse(&server.uri()).unwrap();
        HttpAuthExchange::new(&base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_code_and_decodes_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/google"))
            .and(body_json(serde_json::json!({ "code": "4/0Abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "app-token",
                "user": { "name": "Ada Lovelace", "email": "ada@example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = exchange_for(&server).exchange("4/0Abc").await.unwrap();
        assert_eq!(payload.token, "app-token");
        assert_eq!(payload.user.name, "Ada Lovelace");
        assert_eq!(payload.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/google"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let err = exchange_for(&server).exchange("used-code").await.unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Server);
        assert_eq!(err.status(), Some(400));
        assert!(err.message().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn payload_without_token_is_invalid() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/google"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "user": { "name": "Ada" } })),
            )
            .mount(&server)
            .await;

        let err = exchange_for(&server).exchange("code").await.unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::InvalidResponse);
    }
}
