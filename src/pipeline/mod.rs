//! Per-request orchestration: extract, rank, enrich, synthesize.
//!
//! A run is strictly ordered. Extraction completes before discovery, seed
//! selection before enrichment, and enrichment before the synthesis prompt is
//! built. Only the synthesis output is streamed.

pub mod enrichment;
pub mod error;
pub mod seeding;
pub mod synthesis;

#[cfg(test)]
mod tests;

pub use enrichment::{EnrichedSeed, enrich};
pub use error::PipelineError;
pub use seeding::{SeedSet, build_candidates, select_seeds};
pub use synthesis::{SynthesisRequest, SynthesisStream, stream_synthesis};

use tracing::{debug, info, instrument};

use crate::config::{Config, PipelineConfig};
use crate::discovery::{SearchProvider, WebSearchClient};
use crate::extraction::{ContentExtractor, CrawlServiceClient};
use crate::inference::{GenaiInference, InferenceBackend};
use crate::scoring::Bm25Ranker;
use crate::text::tokenize;

/// The collaborators and settings shared by every run.
pub struct Pipeline<E, S, I> {
    extractor: E,
    search: S,
    inference: I,
    config: PipelineConfig,
    ranker: Bm25Ranker,
}

impl<E, S, I> std::fmt::Debug for Pipeline<E, S, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("ranker", &self.ranker)
            .finish_non_exhaustive()
    }
}

impl Pipeline<CrawlServiceClient, WebSearchClient, GenaiInference> {
    /// Builds the HTTP-backed collaborators from a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let extractor =
            CrawlServiceClient::new(config.extractor_endpoint.clone(), config.http_timeout())?;
        let search = WebSearchClient::new(
            config.search_endpoint.clone(),
            config.search_api_key.clone().unwrap_or_default(),
            config.http_timeout(),
        )?;
        let inference = GenaiInference::new(
            config.inference_endpoint.clone(),
            config.model_identifier.clone(),
        );

        Ok(Self::new(extractor, search, inference, config.pipeline()))
    }
}

impl<E, S, I> Pipeline<E, S, I>
where
    E: ContentExtractor,
    S: SearchProvider,
    I: InferenceBackend,
{
    pub fn new(extractor: E, search: S, inference: I, config: PipelineConfig) -> Self {
        Self {
            extractor,
            search,
            inference,
            config,
            ranker: Bm25Ranker::default(),
        }
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// Runs every stage up to, but not including, the inference call.
    pub async fn prepare(&self, url: &str) -> Result<SynthesisRequest, PipelineError> {
        let primary_content = self.extractor.extract(url).await?;
        debug!(content_len = primary_content.len(), "Primary content extracted");

        let query = tokenize(&primary_content).truncated(self.config.truncation_length);
        debug!(query_tokens = query.len(), "Ranking query built");

        let seeds = select_seeds(&self.search, &self.ranker, url, &query, self.config.top_k).await?;
        let enriched = enrich(&self.search, &seeds, self.config.enrichment_concurrency).await?;

        Ok(SynthesisRequest::new(primary_content, enriched))
    }

    /// Runs the pipeline for `url` and returns the synthesis fragment stream.
    ///
    /// Every error returned here happens before the first fragment. Failures
    /// after that point arrive as an item of the stream.
    #[instrument(skip(self), fields(run_id = %uuid::Uuid::new_v4()))]
    pub async fn run(&self, url: &str) -> Result<SynthesisStream, PipelineError> {
        info!("Pipeline run started");

        let request = self.prepare(url).await?;
        let stream = stream_synthesis(&self.inference, &request).await?;

        info!(
            sources = request.enriched_seeds.len(),
            "Synthesis stream opened"
        );
        Ok(stream)
    }
}
