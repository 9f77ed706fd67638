use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DiscoveryError;

/// Typed view over a web search payload.
///
/// A payload without a `results` key is treated as zero results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One search result.
///
/// Providers differ on the snippet key. Some send `snippet`, some `content`,
/// some both; `snippet` wins when both are present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub snippet: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

impl SearchHit {
    /// Returns `(url, text)` when the hit has a URL and a non-empty snippet or content.
    pub fn usable(&self) -> Option<(&str, &str)> {
        let url = self.url.as_deref().filter(|u| !u.trim().is_empty())?;
        let snippet = self
            .snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.content.as_deref().filter(|c| !c.is_empty()))?;
        Some((url, snippet))
    }
}

impl SearchResults {
    /// Interprets a raw payload returned for `query`.
    pub fn from_value(query: &str, value: &Value) -> Result<Self, DiscoveryError> {
        if !value.is_object() {
            return Err(DiscoveryError::MalformedResponse {
                query: query.to_string(),
                message: "expected a JSON object".to_string(),
            });
        }

        SearchResults::deserialize(value).map_err(|e| DiscoveryError::MalformedResponse {
            query: query.to_string(),
            message: e.to_string(),
        })
    }
}
