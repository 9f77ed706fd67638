use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::error::DiscoveryError;

/// Longest response body excerpt kept in error messages.
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Clone)]
/// HTTP client for a bearer-authenticated web search endpoint.
///
/// Sends `POST {endpoint}` with `{"query": ...}` and returns the JSON payload untouched.
pub struct WebSearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for WebSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WebSearchClient {
    /// Creates a client for `endpoint` using `api_key` as the bearer token.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DiscoveryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs one search and returns the raw payload.
    pub async fn search(&self, query: &str) -> Result<Value, DiscoveryError> {
        debug!(query = query, "Sending web search request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Web search request failed");
                DiscoveryError::ConnectionFailed {
                    url: self.endpoint.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let cut = (0..=ERROR_BODY_LIMIT)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(DiscoveryError::BadStatus {
                query: query.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DiscoveryError::MalformedResponse {
                query: query.to_string(),
                message: e.to_string(),
            })
    }
}
