//! Primary-content extraction collaborator.
//!
//! The page is rendered and converted to Markdown by an external crawl service;
//! the pipeline treats the result as opaque text.

pub mod client;
pub mod error;


pub use client::{CrawlRunConfig, CrawlServiceClient};
pub use error::ExtractionError;

/// Fetches the primary textual content of a page.
pub trait ContentExtractor: Send + Sync {
    /// Returns the extracted Markdown for `url`.
    fn extract(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<String, ExtractionError>> + Send;
}

impl ContentExtractor for CrawlServiceClient {
    async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        self.extract(url).await
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockExtractor;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use super::{ContentExtractor, ExtractionError};

    /// Extractor returning fixed content (or a fixed failure) for every URL.
    #[derive(Debug, Clone)]
    pub struct MockExtractor {
        content: Option<String>,
    }

    impl MockExtractor {
        pub fn new(content: impl Into<String>) -> Self {
            Self {
                content: Some(content.into()),
            }
        }

        pub fn failing() -> Self {
            Self { content: None }
        }
    }

    impl ContentExtractor for MockExtractor {
        async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
            self.content
                .clone()
                .ok_or_else(|| ExtractionError::EmptyContent {
                    target: url.to_string(),
                })
        }
    }
}
