use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::error::ExtractionError;

/// Per-crawl settings sent with every extraction request.
///
/// The defaults bypass the service's cache, drop external links, strip
/// popups/overlays and inline iframe content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRunConfig {
    pub cache_mode: &'static str,
    pub exclude_external_links: bool,
    pub remove_overlay_elements: bool,
    pub process_iframes: bool,
    pub verbose: bool,
}

impl Default for CrawlRunConfig {
    fn default() -> Self {
        Self {
            cache_mode: "bypass",
            exclude_external_links: true,
            remove_overlay_elements: true,
            process_iframes: true,
            verbose: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrawlResponse {
    #[serde(default)]
    results: Vec<CrawlResult>,
}

#[derive(Debug, Deserialize)]
struct CrawlResult {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    markdown: Option<Value>,
    #[serde(default)]
    error_message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Pulls Markdown text out of a crawl result.
///
/// Services return either a plain string or an object carrying `raw_markdown`.
pub(crate) fn markdown_text(markdown: &Value) -> Option<&str> {
    match markdown {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map.get("raw_markdown").and_then(Value::as_str),
        _ => None,
    }
}

#[derive(Clone, Debug)]
/// HTTP client for a headless-browser crawl service.
pub struct CrawlServiceClient {
    http: reqwest::Client,
    base_url: String,
    run_config: CrawlRunConfig,
}

impl CrawlServiceClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ExtractionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractionError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            run_config: CrawlRunConfig::default(),
        })
    }

    /// Overrides the per-crawl settings.
    pub fn with_run_config(mut self, run_config: CrawlRunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    pub fn run_config(&self) -> &CrawlRunConfig {
        &self.run_config
    }

    fn crawl_url(&self) -> String {
        format!("{}/crawl", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn request_body(&self, target: &str) -> Value {
        serde_json::json!({
            "urls": [target],
            "browser_config": {
                "type": "BrowserConfig",
                "params": { "headless": true }
            },
            "crawler_config": {
                "type": "CrawlerRunConfig",
                "params": &self.run_config
            }
        })
    }

    /// Crawls `target` and returns its Markdown content.
    pub async fn extract(&self, target: &str) -> Result<String, ExtractionError> {
        let url = self.crawl_url();
        debug!(target = target, service = %url, "Requesting page extraction");

        let response = self
            .http
            .post(&url)
            .json(&self.request_body(target))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Extraction request failed");
                ExtractionError::ConnectionFailed {
                    url: url.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::BadStatus {
                target: target.to_string(),
                status: status.as_u16(),
            });
        }

        let body: CrawlResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractionError::MalformedResponse {
                    target: target.to_string(),
                    message: e.to_string(),
                })?;

        parse_markdown(target, body)
    }
}

fn parse_markdown(target: &str, body: CrawlResponse) -> Result<String, ExtractionError> {
    let result = body
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ExtractionError::EmptyContent {
            target: target.to_string(),
        })?;

    if !result.success {
        return Err(ExtractionError::CrawlFailed {
            target: target.to_string(),
            message: result
                .error_message
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    result
        .markdown
        .as_ref()
        .and_then(markdown_text)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::EmptyContent {
            target: target.to_string(),
        })
}

#[cfg(test)]
pub(crate) fn parse_markdown_value(target: &str, body: Value) -> Result<String, ExtractionError> {
    let body: CrawlResponse =
        serde_json::from_value(body).map_err(|e| ExtractionError::MalformedResponse {
            target: target.to_string(),
            message: e.to_string(),
        })?;
    parse_markdown(target, body)
}
