//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `CROSSCHECK_*` environment variables.
//! The search API key has no default and must be provided.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ENRICHMENT_CONCURRENCY, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_TOP_K,
    DEFAULT_TRUNCATION_LENGTH,
};

/// Default crawl service URL used when `CROSSCHECK_EXTRACTOR_URL` is not set.
pub const DEFAULT_EXTRACTOR_URL: &str = "http://localhost:11235";

/// Default web search URL used when `CROSSCHECK_SEARCH_URL` is not set.
pub const DEFAULT_SEARCH_URL: &str = "https://ollama.com/api/web_search";

/// Default inference URL used when `CROSSCHECK_INFERENCE_URL` is not set.
pub const DEFAULT_INFERENCE_URL: &str = "http://localhost:11434/v1/";

/// Default model used when `CROSSCHECK_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `CROSSCHECK_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Crawl service base URL.
    pub extractor_endpoint: String,

    /// Web search endpoint.
    pub search_endpoint: String,

    /// Bearer token for the web search endpoint.
    pub search_api_key: Option<String>,

    /// Ollama-compatible inference endpoint.
    pub inference_endpoint: String,

    /// Model used for synthesis.
    pub model_identifier: String,

    /// Maximum number of seeds. Default: `5`.
    pub top_k: usize,

    /// Query tokens kept from the primary content. Default: `200`.
    pub truncation_length: usize,

    /// Enrichment lookups in flight at once. Default: `1` (sequential).
    pub enrichment_concurrency: usize,

    /// Timeout for extraction and search calls. Default: `60` seconds.
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("extractor_endpoint", &self.extractor_endpoint)
            .field("search_endpoint", &self.search_endpoint)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("inference_endpoint", &self.inference_endpoint)
            .field("model_identifier", &self.model_identifier)
            .field("top_k", &self.top_k)
            .field("truncation_length", &self.truncation_length)
            .field("enrichment_concurrency", &self.enrichment_concurrency)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            extractor_endpoint: DEFAULT_EXTRACTOR_URL.to_string(),
            search_endpoint: DEFAULT_SEARCH_URL.to_string(),
            search_api_key: None,
            inference_endpoint: DEFAULT_INFERENCE_URL.to_string(),
            model_identifier: DEFAULT_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            truncation_length: DEFAULT_TRUNCATION_LENGTH,
            enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Ranking and enrichment settings handed to the pipeline at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub truncation_length: usize,
    pub enrichment_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            truncation_length: DEFAULT_TRUNCATION_LENGTH,
            enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "CROSSCHECK_PORT";
    const ENV_BIND_ADDR: &'static str = "CROSSCHECK_BIND_ADDR";
    const ENV_EXTRACTOR_URL: &'static str = "CROSSCHECK_EXTRACTOR_URL";
    const ENV_SEARCH_URL: &'static str = "CROSSCHECK_SEARCH_URL";
    const ENV_SEARCH_API_KEY: &'static str = "CROSSCHECK_SEARCH_API_KEY";
    const ENV_INFERENCE_URL: &'static str = "CROSSCHECK_INFERENCE_URL";
    const ENV_MODEL: &'static str = "CROSSCHECK_MODEL";
    const ENV_TOP_K: &'static str = "CROSSCHECK_TOP_K";
    const ENV_TRUNCATION_LENGTH: &'static str = "CROSSCHECK_TRUNCATION_LENGTH";
    const ENV_ENRICH_CONCURRENCY: &'static str = "CROSSCHECK_ENRICH_CONCURRENCY";
    const ENV_HTTP_TIMEOUT_SECS: &'static str = "CROSSCHECK_HTTP_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let extractor_endpoint =
            Self::parse_string_from_env(Self::ENV_EXTRACTOR_URL, defaults.extractor_endpoint);
        let search_endpoint =
            Self::parse_string_from_env(Self::ENV_SEARCH_URL, defaults.search_endpoint);
        let search_api_key = Self::parse_optional_string_from_env(Self::ENV_SEARCH_API_KEY);
        let inference_endpoint =
            Self::parse_string_from_env(Self::ENV_INFERENCE_URL, defaults.inference_endpoint);
        let model_identifier =
            Self::parse_string_from_env(Self::ENV_MODEL, defaults.model_identifier);
        let top_k = Self::parse_usize_from_env(Self::ENV_TOP_K, "top_k", defaults.top_k)?;
        let truncation_length = Self::parse_usize_from_env(
            Self::ENV_TRUNCATION_LENGTH,
            "truncation_length",
            defaults.truncation_length,
        )?;
        let enrichment_concurrency = Self::parse_usize_from_env(
            Self::ENV_ENRICH_CONCURRENCY,
            "enrichment_concurrency",
            defaults.enrichment_concurrency,
        )?;
        let http_timeout_secs = Self::parse_usize_from_env(
            Self::ENV_HTTP_TIMEOUT_SECS,
            "http_timeout_secs",
            defaults.http_timeout_secs as usize,
        )? as u64;

        Ok(Self {
            port,
            bind_addr,
            extractor_endpoint,
            search_endpoint,
            search_api_key,
            inference_endpoint,
            model_identifier,
            top_k,
            truncation_length,
            enrichment_concurrency,
            http_timeout_secs,
        })
    }

    /// Validates endpoints, numeric bounds and required credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_endpoint("extractor", &self.extractor_endpoint)?;
        Self::validate_endpoint("search", &self.search_endpoint)?;
        Self::validate_endpoint("inference", &self.inference_endpoint)?;

        if self
            .search_api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_SEARCH_API_KEY,
            });
        }

        if self.model_identifier.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_MODEL,
            });
        }

        for (name, value) in [
            ("top_k", self.top_k),
            ("truncation_length", self.truncation_length),
            ("enrichment_concurrency", self.enrichment_concurrency),
            ("http_timeout_secs", self.http_timeout_secs as usize),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { name });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Timeout applied to extraction and search calls.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Settings consumed by [`Pipeline`](crate::pipeline::Pipeline).
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            top_k: self.top_k,
            truncation_length: self.truncation_length,
            enrichment_concurrency: self.enrichment_concurrency,
        }
    }

    fn validate_endpoint(name: &'static str, value: &str) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(value).map_err(|e| ConfigError::InvalidEndpoint {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidEndpoint {
                name,
                value: value.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_usize_from_env(
        var_name: &str,
        name: &'static str,
        default: usize,
    ) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::NumberParseError {
                    name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }
}
