//! Crosscheck library crate (used by the server and integration tests).
//!
//! Given a page URL, the pipeline extracts the page text, discovers and ranks
//! related sources with BM25, enriches each chosen source with a second search,
//! and streams a model-written cross-check back fragment by fragment.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`Pipeline`], [`PipelineError`] - Per-request orchestration
//! - [`SynthesisRequest`], [`SynthesisStream`] - Prompt and sentinel-terminated output
//!
//! ## Ranking
//! - [`tokenize`], [`Document`] - Deterministic tokenization
//! - [`Bm25Ranker`], [`Candidate`], [`ScoredCandidate`] - BM25 Okapi top-k selection
//!
//! ## Collaborators
//! - [`ContentExtractor`] / [`CrawlServiceClient`] - Page text extraction
//! - [`SearchProvider`] / [`WebSearchClient`] - Web search
//! - [`InferenceBackend`] / [`GenaiInference`] - Streaming completions
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod credibility;
pub mod discovery;
pub mod extraction;
pub mod gateway;
pub mod inference;
pub mod pipeline;
pub mod scoring;
pub mod text;

pub use config::{Config, ConfigError, PipelineConfig};
pub use constants::{MAIN_URL_IDENTIFIER, SENTINEL};
pub use credibility::{SourceScore, parse_scores};
pub use discovery::{DiscoveryError, SearchHit, SearchProvider, SearchResults, WebSearchClient};
pub use extraction::{ContentExtractor, CrawlRunConfig, CrawlServiceClient, ExtractionError};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use inference::{FragmentStream, GenaiInference, InferenceBackend, InferenceError};
pub use pipeline::{
    EnrichedSeed, Pipeline, PipelineError, SeedSet, SynthesisRequest, SynthesisStream,
};
pub use scoring::{Bm25Corpus, Bm25Ranker, Candidate, ScoredCandidate, rank};
pub use text::{Document, tokenize};

#[cfg(any(test, feature = "mock"))]
pub use discovery::MockSearchProvider;
#[cfg(any(test, feature = "mock"))]
pub use extraction::MockExtractor;
#[cfg(any(test, feature = "mock"))]
pub use inference::{MockInference, MockStreamProbe};
