use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the content extraction collaborator.
pub enum ExtractionError {
    /// The extraction service could not be reached.
    #[error("failed to reach extraction service at '{url}': {message}")]
    ConnectionFailed {
        /// Service URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("extraction of '{target}' failed with status {status}")]
    BadStatus {
        /// Page that was requested.
        target: String,
        /// HTTP status code.
        status: u16,
    },

    /// The crawl ran but reported failure for the page.
    #[error("crawl of '{target}' failed: {message}")]
    CrawlFailed {
        /// Page that was requested.
        target: String,
        /// Error message reported by the service.
        message: String,
    },

    /// The response did not contain usable Markdown.
    #[error("no content extracted from '{target}'")]
    EmptyContent {
        /// Page that was requested.
        target: String,
    },

    /// The response body could not be decoded.
    #[error("malformed extraction response for '{target}': {message}")]
    MalformedResponse {
        /// Page that was requested.
        target: String,
        /// Error message.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build extraction client: {0}")]
    ClientBuild(String),
}
