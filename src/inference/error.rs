use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the inference collaborator.
pub enum InferenceError {
    /// The stream could not be opened (unreachable service or non-success status).
    #[error("failed to open inference stream for model '{model}': {message}")]
    StreamInit {
        /// Model identifier.
        model: String,
        /// Error message.
        message: String,
    },

    /// The stream broke after it was opened.
    #[error("inference stream interrupted: {0}")]
    StreamInterrupted(String),
}
