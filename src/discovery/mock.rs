use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::discovery::{DiscoveryError, SearchProvider};

/// In-memory search provider for tests.
///
/// Queries without a scripted response return `{"results": []}`. Every query is
/// recorded in call order, before any scripted delay.
#[derive(Clone, Default)]
pub struct MockSearchProvider {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    calls: Arc<Mutex<Vec<String>>>,
    completed: Arc<Mutex<Vec<String>>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the raw payload returned for `query`.
    pub fn with_response(self, query: impl Into<String>, payload: Value) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(query.into(), payload);
        }
        self
    }

    /// Scripts a `{"results": [...]}` payload from `(url, snippet)` pairs.
    pub fn with_results(self, query: impl Into<String>, hits: &[(&str, &str)]) -> Self {
        let results: Vec<Value> = hits
            .iter()
            .map(|(url, snippet)| json!({ "title": url, "url": url, "snippet": snippet }))
            .collect();
        self.with_response(query, json!({ "results": results }))
    }

    /// Makes every search for `query` fail.
    pub fn with_failure(self, query: impl Into<String>, message: impl Into<String>) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(query.into(), message.into());
        }
        self
    }

    /// Delays the answer for `query` by `delay`.
    pub fn with_delay(self, query: impl Into<String>, delay: Duration) -> Self {
        if let Ok(mut delays) = self.delays.lock() {
            delays.insert(query.into(), delay);
        }
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Queries in the order their answers were produced.
    pub fn completions(&self) -> Vec<String> {
        self.completed.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, query: &str) -> Option<Duration> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.to_string());
        }
        self.delays.lock().ok().and_then(|d| d.get(query).copied())
    }

    fn respond(&self, query: &str) -> Result<Value, DiscoveryError> {
        if let Ok(mut completed) = self.completed.lock() {
            completed.push(query.to_string());
        }

        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|f| f.get(query).cloned());
        if let Some(message) = failure {
            return Err(DiscoveryError::ConnectionFailed {
                url: "mock://search".to_string(),
                message,
            });
        }

        let payload = self
            .responses
            .lock()
            .ok()
            .and_then(|r| r.get(query).cloned())
            .unwrap_or_else(|| json!({ "results": [] }));
        Ok(payload)
    }
}

impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str) -> Result<Value, DiscoveryError> {
        if let Some(delay) = self.record(query) {
            tokio::time::sleep(delay).await;
        }
        self.respond(query)
    }
}
