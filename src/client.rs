use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::observability::{CHAT_ERRORS, CHAT_REQUESTS, LOGIN_ERRORS, LOGIN_REQUESTS};
use crate::types::{ChatRequest, ChatResponse, TokenResponse};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Fixed message recorded when the token endpoint cannot be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check if the server is running.";

/// Fallback message recorded when a login failure carries no detail.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// HTTP client for the chat backend.
///
/// Covers the request/reply surface: credential exchange against `/token`
/// and single-turn chat against `/chat`. The underlying client keeps a
/// cookie store, matching the credentials-included login the backend
/// expects. No request timeout is set; a hung backend hangs the call.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: ReqwestClient,
    base_url: String,
}

impl BackendClient {
    /// Create a new client against the default backend address.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = ReqwestClient::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Sends the credentials form-encoded to the token endpoint. Every
    /// failure path resolves to an `Err` the session store can record:
    /// a rejected login surfaces the server's `detail` string (or
    /// [`LOGIN_FAILED_MESSAGE`] when absent), and an unreachable backend
    /// surfaces [`NETWORK_ERROR_MESSAGE`].
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        LOGIN_REQUESTS.click();
        let url = format!("{}/token", self.base_url);

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                LOGIN_ERRORS.click();
                Error::connection(NETWORK_ERROR_MESSAGE, Some(Box::new(e)))
            })?;

        if !response.status().is_success() {
            LOGIN_ERRORS.click();
            return Err(Self::process_login_failure(response).await);
        }

        let token = response.json::<TokenResponse>().await.map_err(|e| {
            LOGIN_ERRORS.click();
            Error::authentication(format!("Malformed token response: {}", e))
        })?;
        Ok(token.access_token)
    }

    /// Send one user message and return the assistant's reply.
    ///
    /// Posts the message JSON-encoded with bearer authorization. Errors
    /// propagate to the caller; the request/reply transport degrades them
    /// to a fallback assistant message so the thread is never interrupted.
    pub async fn chat(&self, text: &str, token: &str) -> Result<String> {
        CHAT_REQUESTS.click();
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&ChatRequest {
                content: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                CHAT_ERRORS.click();
                Error::connection(NETWORK_ERROR_MESSAGE, Some(Box::new(e)))
            })?;

        if !response.status().is_success() {
            CHAT_ERRORS.click();
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status, body));
        }

        let reply = response.json::<ChatResponse>().await.map_err(|e| {
            CHAT_ERRORS.click();
            Error::serialization(
                format!("Failed to parse chat response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(reply.response)
    }

    /// Turn a rejected login response into an authentication error.
    async fn process_login_failure(response: Response) -> Error {
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: Option<String>,
        }

        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail),
            Err(_) => None,
        };

        Error::authentication(detail.unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = BackendClient::new().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let client = BackendClient::with_base_url("http://127.0.0.1:9000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }
}
