use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the web search collaborator.
pub enum DiscoveryError {
    /// The search endpoint could not be reached.
    #[error("failed to reach search endpoint '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The search endpoint answered with a non-success status.
    #[error("search for '{query}' failed with status {status}: {body}")]
    BadStatus {
        /// Query that was sent.
        query: String,
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The response body was not valid JSON or had an unexpected shape.
    #[error("malformed search response for '{query}': {message}")]
    MalformedResponse {
        /// Query that was sent.
        query: String,
        /// Error message.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build search client: {0}")]
    ClientBuild(String),
}
