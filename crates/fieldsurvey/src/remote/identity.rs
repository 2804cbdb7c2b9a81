//! Identity service adapter over the Identity Toolkit REST API.
//!
//! The returned tokens are discarded; this client does no session handling.
//! Every failure, whatever the service said, collapses into one
//! [`Error::Credential`].

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::AuthService;
use crate::config::Config;
use crate::error::{Error, Result};

const SIGN_IN: &str = "sign_in";
const SEND_RESET: &str = "send_reset";

/// Auth service backed by the Identity Toolkit endpoints.
#[derive(Debug, Clone)]
pub struct IdentityToolkit {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

impl IdentityToolkit {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Self::new(
            &config.archive.identity_url,
            api_key,
            config.request_timeout(),
        )
    }

    /// Build a client for an explicit endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn call<B: Serialize + Sync>(
        &self,
        operation: &'static str,
        method: &str,
        body: &B,
    ) -> Result<()> {
        let url = format!("{}/v1/accounts:{method}", self.base_url);
        debug!("Calling identity service: {operation}");

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity service unreachable during {operation}: {e}");
                Error::credential(operation, e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Identity service refused {operation}: HTTP {status}");
        debug!("Identity service response: {body}");
        Err(Error::credential(operation, format!("HTTP {status}")))
    }
}

#[async_trait::async_trait]
impl AuthService for IdentityToolkit {
    async fn verify_credentials(&self, identifier: &str, secret: &str) -> Result<()> {
        let body = SignInRequest {
            email: identifier,
            password: secret,
            return_secure_token: true,
        };
        self.call(SIGN_IN, "signInWithPassword", &body).await
    }

    async fn send_reset(&self, identifier: &str) -> Result<()> {
        let body = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email: identifier,
        };
        self.call(SEND_RESET, "sendOobCode", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn toolkit(server: &Server) -> IdentityToolkit {
        IdentityToolkit::new(&server.url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_verify_credentials_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/accounts:signInWithPassword")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::Json(json!({
                "email": "admin@portal.pk",
                "password": "hunter2",
                "returnSecureToken": true,
            })))
            .with_status(200)
            .with_body(r#"{"idToken": "t", "localId": "u1"}"#)
            .expect(1)
            .create_async()
            .await;

        toolkit(&server)
            .verify_credentials("admin@portal.pk", "hunter2")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_credentials_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": {"message": "EMAIL_NOT_FOUND"}}"#)
            .create_async()
            .await;

        let err = toolkit(&server)
            .verify_credentials("nobody@portal.pk", "x")
            .await
            .unwrap_err();
        assert!(err.is_credential());
        // The service's reason is not surfaced.
        assert!(!err.to_string().contains("EMAIL_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_send_reset_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/accounts:sendOobCode")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "requestType": "PASSWORD_RESET",
                "email": "admin@portal.pk",
            })))
            .with_status(200)
            .with_body(r#"{"email": "admin@portal.pk"}"#)
            .create_async()
            .await;

        toolkit(&server).send_reset("admin@portal.pk").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_reset_unreachable() {
        let toolkit =
            IdentityToolkit::new("http://127.0.0.1:9", "test-key", Duration::from_secs(2)).unwrap();
        let err = toolkit.send_reset("admin@portal.pk").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Credential {
                operation: "send_reset",
                ..
            }
        ));
    }
}
