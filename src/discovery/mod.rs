//! Web search collaborator used for seed discovery and evidence enrichment.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::WebSearchClient;
pub use error::DiscoveryError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSearchProvider;
pub use model::{SearchHit, SearchResults};

use serde_json::Value;

/// Minimal async search interface used by the pipeline.
pub trait SearchProvider: Send + Sync {
    /// Runs a free-text search and returns the provider's raw JSON payload.
    fn search(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Value, DiscoveryError>> + Send;
}

impl SearchProvider for WebSearchClient {
    async fn search(&self, query: &str) -> Result<Value, DiscoveryError> {
        self.search(query).await
    }
}
