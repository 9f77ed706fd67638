//! Streaming language-model collaborator.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use client::GenaiInference;
pub use error::InferenceError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockInference, MockStreamProbe};

use futures_util::stream::BoxStream;

/// Lazily produced text fragments; single pass, dropped to close the upstream connection.
pub type FragmentStream = BoxStream<'static, Result<String, InferenceError>>;

/// Opens a streaming completion for a single prompt.
pub trait InferenceBackend: Send + Sync {
    fn stream(
        &self,
        prompt: String,
    ) -> impl std::future::Future<Output = Result<FragmentStream, InferenceError>> + Send;
}

impl InferenceBackend for GenaiInference {
    async fn stream(&self, prompt: String) -> Result<FragmentStream, InferenceError> {
        self.stream(prompt).await
    }
}
