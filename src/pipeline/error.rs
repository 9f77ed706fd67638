use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::extraction::ExtractionError;
use crate::inference::InferenceError;

/// Request-level failures of a pipeline run.
///
/// None of these are retried. An empty candidate set is not an error; it falls
/// back to the requested URL as the only seed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Primary content could not be obtained.
    #[error("content extraction failed: {0}")]
    ExtractionFailure(#[from] ExtractionError),

    /// The search collaborator failed during seed selection or enrichment.
    #[error("source discovery failed: {0}")]
    DiscoveryFailure(#[from] DiscoveryError),

    /// The inference stream could not be opened.
    #[error("inference failed: {0}")]
    InferenceFailure(#[from] InferenceError),

    /// The inference stream broke after fragments were forwarded.
    #[error("synthesis stream interrupted: {0}")]
    MidStreamFailure(String),
}

impl PipelineError {
    /// Short machine-readable kind, used in logs and response headers.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ExtractionFailure(_) => "extraction_failure",
            PipelineError::DiscoveryFailure(_) => "discovery_failure",
            PipelineError::InferenceFailure(_) => "inference_failure",
            PipelineError::MidStreamFailure(_) => "mid_stream_failure",
        }
    }
}
